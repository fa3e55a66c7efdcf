//! 日志初始化
//!
//! 基于 env_logger，格式为 `时间 | 级别 | 模块:行号 - 消息`（北京时间），
//! 可同时写入日志文件。`RUST_LOG` 优先于配置中的级别。

use std::env;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};

use crate::config::LogConfig;
use crate::services::market_hours::beijing_now;

/// 同时写 stderr 与日志文件
struct TeeWriter<W: Write> {
    file: Option<W>,
}

impl<W: Write> Write for TeeWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stderr().write_all(buf)?;
        if let Some(file) = self.file.as_mut() {
            file.write_all(buf)?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()?;
        if let Some(file) = self.file.as_mut() {
            file.flush()?;
        }
        Ok(())
    }
}

fn format_line(level: log::Level, target: &str, line: Option<u32>, message: &str) -> String {
    format!(
        "{} | {:<8} | {}:{} - {}",
        beijing_now().format("%Y-%m-%d %H:%M:%S"),
        level,
        target,
        line.unwrap_or(0),
        message
    )
}

fn open_log_file(config: &LogConfig) -> io::Result<Option<File>> {
    let Some(path) = config.file.as_ref() else {
        return Ok(None);
    };
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    OpenOptions::new().create(true).append(true).open(path).map(Some)
}

/// 初始化全局日志
pub fn init(config: &LogConfig) -> anyhow::Result<()> {
    let file = open_log_file(config)?;

    let mut builder = env_logger::Builder::new();
    builder.parse_filters(&config.level);
    if let Ok(filters) = env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }

    builder
        .format(|buf, record| {
            let line = format_line(
                record.level(),
                record.target(),
                record.line(),
                &record.args().to_string(),
            );
            writeln!(buf, "{}", line)
        })
        .target(env_logger::Target::Pipe(Box::new(TeeWriter { file })))
        .try_init()?;

    Ok(())
}

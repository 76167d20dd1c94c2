use log::LevelFilter;
use log4rs::{
    append::console::{ConsoleAppender, Target},
    config::{Appender, Config, Root},
    encode::pattern::PatternEncoder,
};

use crate::huffman::code::CodeTable;

const CONFIG_FILE: &str = "log4rs.yaml";

#[ctor::ctor]
fn init() {
    if log4rs::init_file(CONFIG_FILE, Default::default()).is_ok() {
        return;
    }
    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new("{d} {l} {t} - {m}{n}")))
        .build();
    let config = Config::builder()
        .appender(Appender::builder().build("stderr", Box::new(stderr)))
        .build(Root::builder().appender("stderr").build(LevelFilter::Warn));
    if let Ok(config) = config {
        // a logger installed by the host process wins
        let _ = log4rs::init_config(config);
    }
}

pub fn log_code_table(code_table: &CodeTable) {
    if !log::log_enabled!(log::Level::Debug) {
        return;
    }
    let lengths: Vec<usize> = code_table.iter().map(|(_, code)| code.len()).collect();
    log::debug!(
        "Code table holds {} code words, lengths {}..={}",
        lengths.len(),
        lengths.iter().min().unwrap_or(&0),
        lengths.iter().max().unwrap_or(&0)
    );
    for (symbol, code) in code_table.iter() {
        log::debug!("{:02X} {}", symbol, code);
    }
}

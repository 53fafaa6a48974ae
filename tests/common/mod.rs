#![allow(dead_code)]

use std::io;
use std::sync::{Arc, Mutex};

use tierlog::{Encoding, Level, Logger, MakeWriter};

/// In-memory console destination shared between a logger and a test.
#[derive(Clone, Default)]
pub struct Capture(Arc<Mutex<Vec<u8>>>);

impl Capture {
    pub fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }

    /// Every captured line parsed as a JSON record.
    pub fn records(&self) -> Vec<serde_json::Value> {
        self.lines()
            .iter()
            .map(|line| serde_json::from_str(line).expect("record is not valid JSON"))
            .collect()
    }
}

impl io::Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for Capture {
    type Writer = Capture;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// A JSON console logger at `level` writing into a fresh capture.
pub fn json_logger(level: Level) -> (Logger, Capture) {
    let capture = Capture::default();
    let mut logger = Logger::new();
    logger
        .set_level(level)
        .set_encoding(Encoding::Json)
        .set_console_writer(capture.clone());
    logger.init_logger();
    (logger, capture)
}

/// Names of the entries in `dir`, sorted.
pub fn dir_names(dir: &std::path::Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    names.sort();
    names
}

//! `tag = value` config file front end
//!
//! ```text
//! # meter in the basement
//! device  = /dev/ttyUSB0:9600:8N1
//! level   = 1
//! password = 3030303030303030
//! element = 3 1.0.1.8.0.255 2
//! element = 7 1.0.99.1.0.255 2 0-10
//! ```

use crate::element::ElementBuilder;
use crate::error::{ReaderError, ReaderResult};
use crate::parameter::{Field, ParameterBuilder};
use std::path::Path;

const ELEMENT_TAG: &str = "element";

/// Read a config file and merge its fields and elements into `builder`
pub fn load_file(path: &Path, builder: &mut ParameterBuilder) -> ReaderResult<()> {
    let text = std::fs::read_to_string(path).map_err(|source| ReaderError::ConfigIo {
        path: path.to_path_buf(),
        source,
    })?;
    let before = builder.element_count();
    load_str(&text, path, builder)?;
    log::debug!(
        "Loaded {} element(s) from {}",
        builder.element_count() - before,
        path.display()
    );
    Ok(())
}

/// Merge config text into `builder`; `origin` only names the source in errors
pub fn load_str(text: &str, origin: &Path, builder: &mut ParameterBuilder) -> ReaderResult<()> {
    for (index, raw) in text.lines().enumerate() {
        let Some(line) = clean_line(raw) else {
            continue;
        };
        let line_no = index + 1;
        let config_error = |tag: &str, source: ReaderError| ReaderError::Config {
            path: origin.to_path_buf(),
            line: line_no,
            tag: tag.to_string(),
            source: Box::new(source),
        };

        let Some((tag, value)) = line.split_once('=') else {
            return Err(config_error(line.as_str(), ReaderError::Usage("expected 'tag = value'".to_string())));
        };
        let (tag, value) = (tag.trim(), value.trim());

        if tag == ELEMENT_TAG {
            let element = ElementBuilder::parse_line(value).map_err(|e| config_error(tag, e))?;
            builder.push_element(element);
        } else {
            let field = Field::from_tag(tag)
                .ok_or_else(|| config_error(tag, ReaderError::Usage("unknown tag".to_string())))?;
            builder.apply(field, value).map_err(|e| config_error(tag, e))?;
        }
    }
    Ok(())
}

/// Strip the comment, turn tabs into spaces and trim; `None` for blank lines
fn clean_line(raw: &str) -> Option<String> {
    let content = raw.split('#').next().unwrap_or_default();
    let line = content.replace('\t', " ");
    let line = line.trim_matches(' ');
    if line.is_empty() {
        None
    } else {
        Some(line.to_string())
    }
}

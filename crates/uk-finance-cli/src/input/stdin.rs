use serde::de::DeserializeOwned;
use serde_json::Deserializer;
use std::io::{self, Read};

/// Deserialize a single JSON document piped on stdin.
///
/// `Ok(None)` for an interactive terminal or whitespace-only input.
pub fn read_stdin<T: DeserializeOwned>() -> Result<Option<T>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }
    read_document(io::stdin().lock())
}

fn read_document<T: DeserializeOwned, R: Read>(
    reader: R,
) -> Result<Option<T>, Box<dyn std::error::Error>> {
    let mut documents = Deserializer::from_reader(reader).into_iter::<T>();
    let parsed = match documents.next() {
        Some(doc) => doc?,
        None => return Ok(None),
    };
    if documents.next().is_some() {
        return Err("stdin holds more than one JSON document".into());
    }
    Ok(Some(parsed))
}

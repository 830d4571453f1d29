//! Codec for the delimited genre-list column.
//!
//! Genres are stored as a single comma-delimited string. A backslash escapes
//! the delimiter (and itself), so labels containing a comma survive the
//! round trip. Decoding the empty string yields the empty list, not `[""]`.

const DELIMITER: char = ',';
const ESCAPE: char = '\\';

/// Encode a genre list into the stored column form.
pub fn encode(genres: &[String]) -> String {
    let mut out = String::new();
    for (i, genre) in genres.iter().enumerate() {
        if i > 0 {
            out.push(DELIMITER);
        }
        for c in genre.chars() {
            if c == DELIMITER || c == ESCAPE {
                out.push(ESCAPE);
            }
            out.push(c);
        }
    }
    out
}

/// Decode a stored column value back into the genre list.
pub fn decode(encoded: &str) -> Vec<String> {
    if encoded.is_empty() {
        return Vec::new();
    }

    let mut genres = Vec::new();
    let mut current = String::new();
    let mut escaped = false;
    for c in encoded.chars() {
        if escaped {
            current.push(c);
            escaped = false;
        } else if c == ESCAPE {
            escaped = true;
        } else if c == DELIMITER {
            genres.push(std::mem::take(&mut current));
        } else {
            current.push(c);
        }
    }
    genres.push(current);
    genres
}

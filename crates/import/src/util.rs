use encoding_rs::WINDOWS_1252;
use std::borrow::Cow;

const UTF8_BOM: &[u8; 3] = b"\xEF\xBB\xBF";

/// Delimiters tried when sniffing, in tie-break order.
const CANDIDATE_DELIMITERS: [u8; 4] = [b'\t', b';', b',', b'|'];

/// Lines inspected when sniffing the delimiter.
const SNIFF_LINES: usize = 10;

/// Decode text input: UTF-8 (BOM stripped) when valid, otherwise
/// Windows-1252, which is what legacy German accounting exports use.
pub fn decode_text(data: &[u8]) -> Cow<'_, str> {
    let data = data.strip_prefix(UTF8_BOM).unwrap_or(data);
    match std::str::from_utf8(data) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => {
            tracing::debug!("input is not UTF-8, decoding as Windows-1252");
            let (text, _, _) = WINDOWS_1252.decode(data);
            text
        }
    }
}

/// Pick the delimiter that splits the first lines into the most consistent
/// number of fields. A candidate only qualifies if it yields more than one
/// field on the header line; with no qualifying candidate the comma wins.
pub fn sniff_delimiter(text: &str) -> u8 {
    let sample: Vec<&str> = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .take(SNIFF_LINES)
        .collect();

    let mut best = b',';
    let mut best_score = 0usize;

    for delimiter in CANDIDATE_DELIMITERS {
        let widths: Vec<usize> = sample
            .iter()
            .map(|line| field_count(line, delimiter))
            .collect();

        let header_width = match widths.first() {
            Some(&w) if w > 1 => w,
            _ => continue,
        };

        let consistent = widths.iter().filter(|&&w| w == header_width).count();
        let score = consistent * header_width;
        if score > best_score {
            best_score = score;
            best = delimiter;
        }
    }

    best
}

fn field_count(line: &str, delimiter: u8) -> usize {
    csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(line.as_bytes())
        .records()
        .next()
        .and_then(Result::ok)
        .map_or(1, |record| record.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sniff_semicolon() {
        let text = "Belegnummer;Steuersatz;Betrag\n1;19%;100,00\n2;7%;50,00\n";
        assert_eq!(sniff_delimiter(text), b';');
    }

    #[test]
    fn sniff_comma() {
        let text = "Belegnummer,Steuersatz,Betrag\n1,19%,100.00\n";
        assert_eq!(sniff_delimiter(text), b',');
    }

    #[test]
    fn sniff_tab() {
        let text = "a\tb\tc\n1\t2\t3\n";
        assert_eq!(sniff_delimiter(text), b'\t');
    }

    #[test]
    fn sniff_ignores_delimiters_inside_quotes() {
        let text = "Text,Betrag\n\"a;b;c;d\",1\n\"e;f;g;h\",2\n";
        assert_eq!(sniff_delimiter(text), b',');
    }

    #[test]
    fn sniff_single_column_defaults_to_comma() {
        assert_eq!(sniff_delimiter("Betrag\n1\n2\n"), b',');
        assert_eq!(sniff_delimiter(""), b',');
    }

    #[test]
    fn decode_strips_bom() {
        let data = b"\xEF\xBB\xBFBetrag\n";
        assert_eq!(decode_text(data), "Betrag\n");
    }

    #[test]
    fn decode_falls_back_to_windows_1252() {
        // "Übereinstimmung" with Ü encoded as 0xDC
        let data = b"\xDCbereinstimmung";
        assert_eq!(decode_text(data), "Übereinstimmung");
    }
}

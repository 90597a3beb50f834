/// Payload of one complete SSE record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Content of the record's `data:` line(s), joined with `\n`.
    pub data: String,
}

/// Incremental SSE frame decoder.
///
/// Bytes are buffered until a blank-line delimiter (`\n\n` or `\r\n\r\n`)
/// closes a record, so a frame split anywhere across chunks (including inside
/// a multi-byte character) decodes the same as if it arrived in one piece.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buf: Vec<u8>,
    // Offset before which `buf` is known to hold no delimiter.
    scanned: usize,
}

impl FrameDecoder {
    /// Appends `chunk` and returns every frame it completes, in order.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<Frame> {
        if chunk.is_empty() {
            return Vec::new();
        }
        self.buf.extend_from_slice(chunk);

        let mut frames = Vec::new();
        while let Some((idx, delim_len)) = find_frame_delimiter(&self.buf, self.scanned) {
            let record: Vec<u8> = self.buf.drain(..idx + delim_len).take(idx).collect();
            self.scanned = 0;
            if let Some(frame) = parse_record(&record) {
                frames.push(frame);
            }
        }
        // A delimiter may still complete across the last three buffered bytes.
        self.scanned = self.buf.len().saturating_sub(3);
        frames
    }

    /// Drains the undelimited remainder as one final record.
    ///
    /// Used when the transport closes without a trailing blank line.
    pub fn finish(&mut self) -> Option<Frame> {
        let record = std::mem::take(&mut self.buf);
        self.scanned = 0;
        parse_record(&record)
    }

    /// Bytes received but not yet resolved into a frame.
    pub fn pending(&self) -> &[u8] {
        &self.buf
    }
}

fn find_frame_delimiter(buf: &[u8], from: usize) -> Option<(usize, usize)> {
    let mut i = from;
    while i + 1 < buf.len() {
        if buf[i] == b'\n' && buf[i + 1] == b'\n' {
            return Some((i, 2));
        }
        if i + 3 < buf.len()
            && buf[i] == b'\r'
            && buf[i + 1] == b'\n'
            && buf[i + 2] == b'\r'
            && buf[i + 3] == b'\n'
        {
            return Some((i, 4));
        }
        i += 1;
    }
    None
}

fn parse_record(bytes: &[u8]) -> Option<Frame> {
    if bytes.is_empty() {
        return None;
    }
    let text = String::from_utf8_lossy(bytes);
    let mut data_lines: Vec<&str> = Vec::new();
    for raw_line in text.split('\n') {
        let line = raw_line.trim_end_matches('\r');
        if let Some(rest) = line.strip_prefix("data:") {
            data_lines.push(rest.strip_prefix(' ').unwrap_or(rest));
        }
    }
    if data_lines.is_empty() {
        return None;
    }
    Some(Frame {
        data: data_lines.join("\n"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(frames: &[Frame]) -> Vec<&str> {
        frames.iter().map(|f| f.data.as_str()).collect()
    }

    #[test]
    fn partial_frame_is_kept_until_delimiter_arrives() {
        let mut decoder = FrameDecoder::default();
        assert!(decoder.feed(b"data: {\"token\":\"hel").is_empty());
        assert_eq!(decoder.pending(), b"data: {\"token\":\"hel");
        let frames = decoder.feed(b"lo\"}\n\n");
        assert_eq!(data(&frames), vec!["{\"token\":\"hello\"}"]);
        assert!(decoder.pending().is_empty());
    }

    #[test]
    fn delimiter_split_across_chunks_is_found() {
        let mut decoder = FrameDecoder::default();
        assert!(decoder.feed(b"data: {\"done\":true}\n").is_empty());
        let frames = decoder.feed(b"\ndata: {\"tok");
        assert_eq!(data(&frames), vec!["{\"done\":true}"]);
        assert_eq!(decoder.pending(), b"data: {\"tok");
    }

    #[test]
    fn crlf_delimiter_split_across_chunks_is_found() {
        let mut decoder = FrameDecoder::default();
        assert!(decoder.feed(b"data: a\r\n\r").is_empty());
        assert_eq!(data(&decoder.feed(b"\n")), vec!["a"]);
    }

    #[test]
    fn several_frames_in_one_chunk_come_out_in_order() {
        let mut decoder = FrameDecoder::default();
        let frames = decoder.feed(b"data: 1\n\ndata: 2\n\ndata: 3\n\ndata: 4");
        assert_eq!(data(&frames), vec!["1", "2", "3"]);
        assert_eq!(decoder.pending(), b"data: 4");
    }

    #[test]
    fn empty_chunk_leaves_buffer_untouched() {
        let mut decoder = FrameDecoder::default();
        decoder.feed(b"data: x");
        assert!(decoder.feed(b"").is_empty());
        assert_eq!(decoder.pending(), b"data: x");
    }

    #[test]
    fn whitespace_only_chunks_yield_no_frames() {
        let mut decoder = FrameDecoder::default();
        assert!(decoder.feed(b"\n").is_empty());
        assert!(decoder.feed(b"\n\n  \n\n").is_empty());
        assert!(decoder.finish().is_none());
    }

    #[test]
    fn records_without_data_lines_are_dropped() {
        let mut decoder = FrameDecoder::default();
        let frames = decoder.feed(b": keep-alive\n\nretry: 100\n\nevent: message\ndata: ok\n\n");
        assert_eq!(data(&frames), vec!["ok"]);
    }

    #[test]
    fn data_prefix_space_is_optional_and_multiline_data_is_joined() {
        let mut decoder = FrameDecoder::default();
        let frames = decoder.feed(b"data:{\"a\":1}\n\ndata: line1\ndata: line2\n\n");
        assert_eq!(data(&frames), vec!["{\"a\":1}", "line1\nline2"]);
    }

    #[test]
    fn multibyte_character_split_across_chunks_survives() {
        let bytes = "data: {\"token\":\"héllo\"}\n\n".as_bytes();
        let split = bytes.iter().position(|b| *b == 0xC3).expect("multibyte") + 1;
        let mut decoder = FrameDecoder::default();
        assert!(decoder.feed(&bytes[..split]).is_empty());
        assert_eq!(
            data(&decoder.feed(&bytes[split..])),
            vec!["{\"token\":\"héllo\"}"]
        );
    }

    #[test]
    fn finish_returns_trailing_record_without_delimiter() {
        let mut decoder = FrameDecoder::default();
        decoder.feed(b"data: {\"token\":\"a\"}\n\ndata: {\"done\":true}");
        let last = decoder.finish().expect("residual frame");
        assert_eq!(last.data, "{\"done\":true}");
        assert!(decoder.pending().is_empty());
        assert!(decoder.finish().is_none());
    }
}

/// One manifest out of a rendered `helm template` stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderedDocument<'a> {
    /// Template path from the `# Source:` comment helm writes above each manifest.
    pub source: Option<&'a str>,
    /// 1-based line of `text` within the whole stream.
    pub start_line: usize,
    /// Body of the document, starting at its first content line.
    pub text: &'a str,
}

const SOURCE_PREFIX: &str = "# Source:";

fn is_separator(line: &str) -> bool {
    let line = line.trim_end();
    line == "..." || line == "---" || line.starts_with("--- ")
}

fn is_preamble(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty() || trimmed.starts_with('#')
}

fn flush<'a>(
    docs: &mut Vec<RenderedDocument<'a>>,
    stream: &'a str,
    source: &mut Option<&'a str>,
    body: &mut Option<(usize, usize)>,
    start_line: usize,
) {
    let source = source.take();
    if let Some((start, end)) = body.take() {
        docs.push(RenderedDocument {
            source,
            start_line,
            text: &stream[start..end],
        });
    }
}

/// Split a multi-document stream at `---`/`...` lines.
///
/// Blank and comment lines leading a document are dropped so its body starts at
/// the first line of content; documents without content are omitted.
#[must_use]
pub fn split_documents(stream: &str) -> Vec<RenderedDocument<'_>> {
    let mut docs = Vec::new();
    let mut source = None;
    let mut body: Option<(usize, usize)> = None;
    let mut start_line = 0;
    let mut pos = 0;

    for (idx, raw) in stream.split_inclusive('\n').enumerate() {
        let line = raw.trim_end_matches(['\n', '\r']);
        let line_start = pos;
        pos += raw.len();

        if is_separator(line) {
            flush(&mut docs, stream, &mut source, &mut body, start_line);
            continue;
        }
        if let Some((_, end)) = body.as_mut() {
            *end = pos;
        } else if let Some(path) = line.strip_prefix(SOURCE_PREFIX) {
            source = Some(path.trim());
        } else if !is_preamble(line) {
            body = Some((line_start, pos));
            start_line = idx + 1;
        }
    }
    flush(&mut docs, stream, &mut source, &mut body, start_line);
    docs
}

use crate::model::ChangeEvent;

/// Transport limit per posted message, in characters.
pub const MAX_CHUNK_LEN: usize = 1900;

/// One marker line per classification; Modified carries the old and new
/// timestamp pair.
pub fn line(event: &ChangeEvent) -> String {
    match event {
        ChangeEvent::Added { name, timestamp } => {
            format!("🆕 Added: `{name}` ({timestamp})")
        }
        ChangeEvent::Removed { name, timestamp } => {
            format!("🗑️ Deleted: `{name}` ({timestamp})")
        }
        ChangeEvent::Modified {
            name,
            previous,
            current,
        } => {
            format!("🔄 Updated: `{name}` ({previous} -> {current})")
        }
    }
}

/// Renders a change report: a header naming the watched source, a blank
/// line, then one marker line per event.
pub fn render(source_url: &str, events: &[ChangeEvent]) -> String {
    let mut out = format!("🚨 Updates detected on {source_url} 🚨\n");
    for event in events {
        out.push('\n');
        out.push_str(&line(event));
    }
    out
}

/// Splits text at a fixed character boundary: every chunk is exactly
/// `max_len` characters except a shorter final remainder. Mid-line splits
/// are expected; concatenating the chunks reproduces the input exactly.
pub fn split_chunks(text: &str, max_len: usize) -> Vec<String> {
    assert!(max_len > 0, "chunk length must be positive");
    let mut chunks = Vec::new();
    let mut buf = String::new();
    let mut count = 0;
    for ch in text.chars() {
        buf.push(ch);
        count += 1;
        if count == max_len {
            chunks.push(std::mem::take(&mut buf));
            count = 0;
        }
    }
    if !buf.is_empty() || chunks.is_empty() {
        chunks.push(buf);
    }
    chunks
}

/// Full reporter surface: render the events, then chunk for the transport.
/// Delivery order of the returned chunks must be preserved by the caller.
pub fn format(source_url: &str, events: &[ChangeEvent]) -> Vec<String> {
    split_chunks(&render(source_url, events), MAX_CHUNK_LEN)
}

/*!
 * Extraction of the translated line list from a raw model reply.
 *
 * Models frequently wrap the requested JSON list in markdown fences or
 * conversational text; the parser cuts the outermost bracketed span out of
 * the reply before decoding it.
 */

use log::trace;

/// Decode a JSON array of strings
fn decode_list(text: &str) -> Option<Vec<String>> {
    serde_json::from_str::<Vec<String>>(text).ok()
}

/// Recover an ordered list of strings from a raw reply
///
/// Tries the span from the first `[` to the last `]` first, then the whole
/// text. Returns `None` when neither decodes to a list of strings.
pub fn parse_response(raw: &str) -> Option<Vec<String>> {
    if let (Some(start), Some(end)) = (raw.find('['), raw.rfind(']')) {
        if start < end {
            if let Some(list) = decode_list(&raw[start..=end]) {
                return Some(list);
            }
            trace!("Bracketed span did not decode, trying the whole reply");
        }
    }

    decode_list(raw.trim())
}

//! Property-based tests for streamed response decoding
//!
//! Invariants:
//! - Every fragment is yielded exactly once, in backend order
//! - The accumulated reply equals the concatenation of the fragments
//! - Chunk boundaries in the transport never change the result

use super::ollama::decode_generate_stream;
use super::{FragmentStream, LlmError};
use proptest::prelude::*;
use serde_json::json;

/// Fragment text including quotes, escapes, newlines and multi-byte chars
fn arb_fragment() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 .,!?\"\\\\\n\u{e9}\u{4e16}\u{1f600}]{1,12}"
}

/// Serialize fragments the way the backend does, followed by the done marker
fn ndjson_body(fragments: &[String]) -> Vec<u8> {
    let mut body = String::new();
    for fragment in fragments {
        body.push_str(&json!({"response": fragment, "done": false}).to_string());
        body.push('\n');
    }
    body.push_str(&json!({"response": "", "done": true}).to_string());
    body.push('\n');
    body.into_bytes()
}

/// Cut a body at the given (sorted, deduplicated) byte offsets
fn split_at(body: &[u8], mut cuts: Vec<usize>) -> Vec<Vec<u8>> {
    cuts.retain(|&c| c > 0 && c < body.len());
    cuts.sort_unstable();
    cuts.dedup();

    let mut chunks = Vec::new();
    let mut start = 0;
    for cut in cuts {
        chunks.push(body[start..cut].to_vec());
        start = cut;
    }
    chunks.push(body[start..].to_vec());
    chunks
}

fn run_stream(chunks: Vec<Vec<u8>>) -> (Vec<String>, String) {
    let body = futures::stream::iter(chunks.into_iter().map(Ok::<_, LlmError>));
    let mut stream = FragmentStream::new(decode_generate_stream(body));

    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap();
    runtime.block_on(async {
        let mut fragments = Vec::new();
        while let Some(item) = stream.next_fragment().await {
            fragments.push(item.unwrap());
        }
        (fragments, stream.into_text())
    })
}

proptest! {
    #[test]
    fn prop_fragments_forwarded_in_order(
        fragments in proptest::collection::vec(arb_fragment(), 0..20),
    ) {
        let (forwarded, text) = run_stream(vec![ndjson_body(&fragments)]);
        prop_assert_eq!(&forwarded, &fragments);
        prop_assert_eq!(text, fragments.concat());
    }

    #[test]
    fn prop_chunk_boundaries_do_not_matter(
        fragments in proptest::collection::vec(arb_fragment(), 1..10),
        cuts in proptest::collection::vec(0usize..2000, 0..30),
    ) {
        let body = ndjson_body(&fragments);
        let (forwarded, text) = run_stream(split_at(&body, cuts));
        prop_assert_eq!(&forwarded, &fragments);
        prop_assert_eq!(text, fragments.concat());
    }

    #[test]
    fn prop_garbage_lines_are_skipped(
        fragments in proptest::collection::vec(arb_fragment(), 1..10),
        garbage in "[a-z{:]{1,10}",
    ) {
        // Interleave an undecodable line after every fragment line
        let mut body = String::new();
        for fragment in &fragments {
            body.push_str(&json!({"response": fragment, "done": false}).to_string());
            body.push('\n');
            body.push_str(&garbage);
            body.push('\n');
        }
        body.push_str("{\"response\":\"\",\"done\":true}\n");

        let (forwarded, _) = run_stream(vec![body.into_bytes()]);
        // Without a closing brace no garbage line can decode to a chunk
        prop_assert_eq!(forwarded, fragments);
    }
}

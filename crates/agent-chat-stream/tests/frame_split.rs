use agent_chat_stream::{FrameDecoder, StreamEvent, classify};
use proptest::prelude::*;

fn decode(chunks: &[&[u8]]) -> Vec<StreamEvent> {
    let mut decoder = FrameDecoder::default();
    let mut events: Vec<StreamEvent> = chunks
        .iter()
        .flat_map(|chunk| decoder.feed(chunk))
        .filter_map(|frame| classify(&frame))
        .collect();
    events.extend(decoder.finish().and_then(|frame| classify(&frame)));
    events
}

fn record(event: &StreamEvent) -> String {
    let payload = match event {
        StreamEvent::Token(text) => serde_json::json!({ "token": text }),
        StreamEvent::Done => serde_json::json!({ "done": true }),
        StreamEvent::Error(message) => serde_json::json!({ "error": message }),
    };
    format!("data: {payload}\n\n")
}

fn event_strategy() -> impl Strategy<Value = StreamEvent> {
    prop_oneof![
        4 => "[a-zA-Z0-9 éü日本\\n\"\\\\]{1,12}".prop_map(StreamEvent::Token),
        1 => Just(StreamEvent::Done),
        1 => "[a-z ]{1,10}".prop_map(StreamEvent::Error),
    ]
}

#[test]
fn every_single_split_offset_decodes_identically() {
    let stream = concat!(
        "data: {\"token\":\"Hi\"}\n\n",
        ": keep-alive\n\n",
        "data: not-json\n\n",
        "data: {\"token\":\"\"}\n\n",
        "data: {\"token\":\" thére\"}\r\n\r\n",
        "data: {\"done\":true}\n\n",
    )
    .as_bytes();
    let whole = decode(&[stream]);
    assert_eq!(
        whole,
        vec![
            StreamEvent::Token("Hi".into()),
            StreamEvent::Token(" thére".into()),
            StreamEvent::Done
        ]
    );
    for offset in 0..=stream.len() {
        assert_eq!(
            decode(&[&stream[..offset], &stream[offset..]]),
            whole,
            "split at {offset}"
        );
    }
}

proptest! {
    #[test]
    fn arbitrary_partitions_decode_like_one_chunk(
        events in prop::collection::vec(event_strategy(), 0..12),
        cuts in prop::collection::vec(any::<prop::sample::Index>(), 0..8),
    ) {
        let stream: String = events.iter().map(record).collect();
        let bytes = stream.as_bytes();

        let mut offsets: Vec<usize> = cuts.iter().map(|c| c.index(bytes.len() + 1)).collect();
        offsets.sort_unstable();
        let mut chunks: Vec<&[u8]> = Vec::new();
        let mut start = 0;
        for offset in offsets {
            chunks.push(&bytes[start..offset]);
            start = offset;
        }
        chunks.push(&bytes[start..]);

        prop_assert_eq!(decode(&chunks), events.clone());
        prop_assert_eq!(decode(&[bytes]), events);
    }
}

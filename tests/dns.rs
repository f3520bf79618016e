// Each case in test_data.yaml is a canned response, and how it should be displayed.
use pretty_assertions::assert_eq;
use serde::Deserialize;
use std::fs;
use stubdns::{Message, Transport};

const TEST_DATA_FILENAME: &str = "tests/test_data.yaml";

#[derive(Deserialize)]
struct TestCase {
    // Name of the test case.
    name: String,

    // Hex encoded binary string.
    binary: String,

    // Dig-ish formatted output.
    string: String,
}

fn test_cases() -> Vec<TestCase> {
    let s = fs::read(TEST_DATA_FILENAME).expect("failed read test input");
    serde_yaml::from_slice(&s).expect("failed to deserialise test input")
}

#[test]
fn tests() {
    for case in test_cases() {
        test_from_slice(case);
    }
}

#[test]
fn tests_tcp_framed() {
    for case in test_cases() {
        let input = hex::decode(&case.binary).expect("invalid test case input");

        let mut frame = (input.len() as u16).to_be_bytes().to_vec();
        frame.extend_from_slice(&input);

        let framed = Message::from_frame(&frame, Transport::Tcp)
            .unwrap_or_else(|e| panic!("{}: Unable to parse frame: {}", case.name, e));
        let unframed = Message::from_slice(&input).unwrap();

        assert_eq!(framed, unframed, "{}: framing changed the result", case.name);
    }
}

#[test]
fn tests_truncated() {
    for case in test_cases() {
        let input = hex::decode(&case.binary).expect("invalid test case input");

        // Every proper prefix of a response must be rejected, not panic.
        for len in 0..input.len() {
            assert!(
                Message::from_slice(&input[..len]).is_err(),
                "{}: parsed with only {} of {} bytes",
                case.name,
                len,
                input.len()
            );
        }
    }
}

// Collapses runs of whitespace, so column alignment isn't significant.
fn normalise_whitespace(s: &str) -> String {
    s.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .collect::<Vec<_>>()
        .join("\n")
        .trim_end()
        .to_string()
}

fn test_from_slice(case: TestCase) {
    let input = match hex::decode(case.binary) {
        Err(e) => panic!("{}: Invalid test case input: {}", case.name, e),
        Ok(i) => i,
    };
    let m = match Message::from_slice(&input) {
        Err(e) => panic!("{}: Unable to parse: {}", case.name, e),
        Ok(p) => p,
    };

    assert_eq!(m.answers.len(), usize::from(m.an_count), "{}", case.name);
    assert_eq!(m.authoritys.len(), usize::from(m.ns_count), "{}", case.name);
    assert_eq!(m.additionals.len(), usize::from(m.ar_count), "{}", case.name);

    let got = normalise_whitespace(&format!("{}", m));
    let want = normalise_whitespace(&case.string);

    assert_eq!(got, want, "{}: Formatted string doesn't match", case.name);
}

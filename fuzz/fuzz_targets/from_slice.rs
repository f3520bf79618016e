#![no_main]
#[macro_use]
extern crate libfuzzer_sys;
extern crate stubdns;

fuzz_target!(|data: &[u8]| {
    // Any input must either parse, or fail cleanly.
    if let Ok(m) = stubdns::Message::from_slice(data) {
        let _ = m.to_string();
    }
    let _ = stubdns::Message::from_frame(data, stubdns::Transport::Tcp);
});

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use scanrc::wire::{Direction, Wire, WireCodec};

#[derive(Debug, Arbitrary)]
struct Values {
    words: Vec<i64>,
    text: String,
    bytes: Vec<u8>,
    chars: Vec<char>,
    pointer: Option<i32>,
}

fuzz_target!(|v: Values| {
    let pointer = v.pointer.map(Box::new);
    let mut out = Vec::new();
    let mut wire = Wire::new(&mut out, Direction::Encode);
    v.words.encode(&mut wire);
    v.text.encode(&mut wire);
    v.bytes.encode(&mut wire);
    v.chars.encode(&mut wire);
    pointer.encode(&mut wire);
    wire.finish().unwrap();

    let mut input: &[u8] = &out;
    let mut wire = Wire::new(&mut input, Direction::Decode);
    let mut words: Vec<i64> = Vec::new();
    let mut text = String::new();
    let mut bytes: Vec<u8> = Vec::new();
    let mut chars: Vec<char> = Vec::new();
    let mut back_pointer: Option<Box<i32>> = None;
    words.decode(&mut wire);
    text.decode(&mut wire);
    bytes.decode(&mut wire);
    chars.decode(&mut wire);
    back_pointer.decode(&mut wire);
    assert!(wire.is_ok());

    assert_eq!(words, v.words);
    assert_eq!(text, v.text);
    assert_eq!(bytes, v.bytes);
    assert_eq!(chars, v.chars);
    assert_eq!(back_pointer, pointer);
});

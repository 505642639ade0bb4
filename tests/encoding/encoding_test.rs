#[cfg(test)]
mod tests {
    use paramdoc::encoding::{decode, encode, force_encode, needs_encoding};

    #[test]
    fn test_substitute_character() {
        let encoded = encode("\u{1a}");
        assert!(encoded.encoded);
        assert_eq!(encoded.text, "Gg==");
    }

    #[test]
    fn test_non_latin_text_is_not_encoded() {
        for raw in ["果物", "Äpfel", "яблоко", "تفاح", "🍎"] {
            let encoded = encode(raw);
            assert!(!encoded.encoded, "{raw} should stay readable");
            assert_eq!(encoded.text, raw);
        }
    }

    #[test]
    fn test_punctuation_is_not_encoded() {
        let raw = "+ / : ; = ? [ ] ^ \\";
        let encoded = encode(raw);
        assert!(!encoded.encoded);
        assert_eq!(encoded.text, raw);

        assert!(!needs_encoding("<tag attr=\"x\"> & 'quoted'"));
    }

    #[test]
    fn test_empty_string() {
        let encoded = encode("");
        assert!(!encoded.encoded);
        assert_eq!(encoded.text, "");
    }

    #[test]
    fn test_control_character_anywhere_encodes_whole_value() {
        let encoded = encode("before\u{7}after");
        assert!(encoded.encoded);
        assert_eq!(decode(&encoded.text).unwrap(), "before\u{7}after");
    }

    #[test]
    fn test_encoded_values_decode_to_original() {
        let samples = [
            "\u{0}",
            "\u{1a}",
            "tab\tand\u{1b}escape",
            "果物\u{2}",
            "\u{1f}\u{1e}\u{1d}",
        ];

        for raw in samples {
            let encoded = encode(raw);
            assert!(encoded.encoded);
            assert_eq!(decode(&encoded.text).unwrap(), raw);
        }
    }

    #[test]
    fn test_force_encode_uses_standard_padded_alphabet() {
        assert_eq!(force_encode("a"), "YQ==");
        assert_eq!(force_encode("ab"), "YWI=");
        assert_eq!(force_encode("果物"), "5p6c54mp");
        assert_eq!(force_encode("\u{fb}\u{ff}"), "w7vDvw==");
    }
}

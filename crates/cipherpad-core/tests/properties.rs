use std::sync::Arc;

use cipherpad_core::codec;
use cipherpad_core::crypto::{
    generate_salt, hash_password, NoteCipher, SymmetricKey, IV_LENGTH, TAG_LENGTH,
};
use cipherpad_core::CipherpadError;
use proptest::prelude::*;

fn cipher() -> NoteCipher {
    NoteCipher::new(Arc::new(SymmetricKey::generate().unwrap()))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn codec_round_trips_any_bytes(bytes in prop::collection::vec(any::<u8>(), 0..10_000)) {
        let text = codec::encode(&bytes);
        prop_assert!(text.is_ascii());
        prop_assert_eq!(codec::decode(&text).unwrap(), bytes);
    }

    #[test]
    fn codec_rejects_foreign_characters(
        bytes in prop::collection::vec(any::<u8>(), 1..256),
        bad in prop::sample::select(vec!['!', '*', '#', ' ', 'é', '~']),
        at in any::<prop::sample::Index>(),
    ) {
        let mut chars: Vec<char> = codec::encode(&bytes).chars().collect();
        let index = at.index(chars.len());
        chars[index] = bad;
        let text: String = chars.into_iter().collect();
        prop_assert!(matches!(
            codec::decode(&text),
            Err(CipherpadError::MalformedEncoding(_))
        ));
    }

    #[test]
    fn cipher_round_trips_any_text(body in any::<String>()) {
        let cipher = cipher();
        let sealed = cipher.encrypt(&body).unwrap();
        prop_assert_eq!(sealed.ciphertext.len(), body.len() + TAG_LENGTH);
        prop_assert_eq!(cipher.decrypt(&sealed.ciphertext, &sealed.iv).unwrap(), body);
    }

    #[test]
    fn flipping_a_ciphertext_bit_is_detected(
        body in ".{0,200}",
        at in any::<prop::sample::Index>(),
        bit in 0u8..8,
    ) {
        let cipher = cipher();
        let sealed = cipher.encrypt(&body).unwrap();
        let mut tampered = sealed.ciphertext.clone();
        let index = at.index(tampered.len());
        tampered[index] ^= 1 << bit;

        prop_assert!(matches!(
            cipher.decrypt(&tampered, &sealed.iv),
            Err(CipherpadError::AuthenticationFailed)
        ));
    }

    #[test]
    fn flipping_an_iv_bit_is_detected(
        body in ".{0,200}",
        index in 0usize..IV_LENGTH,
        bit in 0u8..8,
    ) {
        let cipher = cipher();
        let sealed = cipher.encrypt(&body).unwrap();
        let mut iv = sealed.iv;
        iv[index] ^= 1 << bit;

        prop_assert!(matches!(
            cipher.decrypt(&sealed.ciphertext, &iv),
            Err(CipherpadError::AuthenticationFailed)
        ));
    }

    #[test]
    fn fresh_salts_give_distinct_digests(password in "[ -~]{1,64}") {
        let first = hash_password(&password, &generate_salt().unwrap());
        let second = hash_password(&password, &generate_salt().unwrap());
        prop_assert!(!first.matches(&second));
    }
}

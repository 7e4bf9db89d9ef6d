use proptest::prelude::*;

use coinage_types::{Address, Amount, Big, CurrencyId, Hash, Token};

fn currency_id() -> impl Strategy<Value = CurrencyId> {
    "[A-Z][A-Z0-9]{2,9}".prop_map(|s| CurrencyId::new(s).unwrap())
}

proptest! {
    /// Hash roundtrip: new -> as_bytes -> new produces identical hash.
    #[test]
    fn hash_roundtrip(bytes in prop::array::uniform32(0u8..)) {
        let hash = Hash::new(bytes);
        prop_assert_eq!(hash.as_bytes(), &bytes);
    }

    /// Hash::is_zero is true only for all-zero bytes.
    #[test]
    fn hash_is_zero_correct(bytes in prop::array::uniform32(0u8..)) {
        let hash = Hash::new(bytes);
        prop_assert_eq!(hash.is_zero(), bytes == [0u8; 32]);
    }

    /// Hash bincode serialization roundtrip.
    #[test]
    fn hash_bincode_roundtrip(bytes in prop::array::uniform32(0u8..)) {
        let hash = Hash::new(bytes);
        let encoded = bincode::serialize(&hash).unwrap();
        let decoded: Hash = bincode::deserialize(&encoded).unwrap();
        prop_assert_eq!(decoded.as_bytes(), hash.as_bytes());
    }

    /// Big decimal-string roundtrip through both codecs.
    #[test]
    fn big_codec_roundtrip(v in any::<i128>()) {
        let big = Big::from(v);
        let json = serde_json::to_string(&big).unwrap();
        prop_assert_eq!(&serde_json::from_str::<Big>(&json).unwrap(), &big);
        let bin = bincode::serialize(&big).unwrap();
        prop_assert_eq!(&bincode::deserialize::<Big>(&bin).unwrap(), &big);
    }

    /// Big display/parse roundtrip.
    #[test]
    fn big_parse_roundtrip(v in any::<i128>()) {
        let big: Big = v.to_string().parse().unwrap();
        prop_assert_eq!(big.to_string(), v.to_string());
    }

    /// Addition and subtraction are inverses.
    #[test]
    fn big_add_sub_inverse(a in any::<i64>(), b in any::<i64>()) {
        let big_a = Big::from(a);
        let big_b = Big::from(b);
        let back = big_a.clone() + big_b.clone() - big_b;
        prop_assert_eq!(back, big_a);
    }

    /// over_zero and is_negative agree with the source integer.
    #[test]
    fn big_sign_predicates(v in any::<i64>()) {
        let big = Big::from(v);
        prop_assert_eq!(big.over_zero(), v > 0);
        prop_assert_eq!(big.is_negative(), v < 0);
        prop_assert_eq!(big.is_zero(), v == 0);
    }

    /// Canonical bytes are injective over a practical range.
    #[test]
    fn big_bytes_injective(a in any::<i64>(), b in any::<i64>()) {
        prop_assert_eq!(Big::from(a).to_bytes() == Big::from(b).to_bytes(), a == b);
    }

    /// Amount CURRENCY:VALUE parse/display roundtrip.
    #[test]
    fn amount_parse_roundtrip(cur in currency_id(), v in 0u64..u64::MAX) {
        let amount = Amount::new(Big::from(v), cur);
        let parsed: Amount = amount.to_string().parse().unwrap();
        prop_assert_eq!(parsed, amount);
    }

    /// Amount serde roundtrip through JSON.
    #[test]
    fn amount_json_roundtrip(cur in currency_id(), v in 0u64..u64::MAX) {
        let amount = Amount::new(Big::from(v), cur);
        let json = serde_json::to_string(&amount).unwrap();
        prop_assert_eq!(&serde_json::from_str::<Amount>(&json).unwrap(), &amount);
    }

    /// Zero addresses are valid, recognizable, and distinct per currency.
    #[test]
    fn zero_address_valid(cur in currency_id()) {
        let addr = Address::zero(&cur);
        prop_assert!(addr.is_valid().is_ok());
        prop_assert!(addr.is_zero_address());
    }

    /// Token hex serde roundtrip.
    #[test]
    fn token_serde_roundtrip(bytes in prop::collection::vec(any::<u8>(), 1..=100)) {
        let token = Token::new(bytes).unwrap();
        let json = serde_json::to_string(&token).unwrap();
        prop_assert_eq!(&serde_json::from_str::<Token>(&json).unwrap(), &token);
        let bin = bincode::serialize(&token).unwrap();
        prop_assert_eq!(&bincode::deserialize::<Token>(&bin).unwrap(), &token);
    }
}

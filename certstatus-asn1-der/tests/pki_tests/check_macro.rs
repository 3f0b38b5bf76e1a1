macro_rules! check {
    ($element:ident in $encoded:ident[$start:literal..$end:literal]) => {
        let encoded = &$encoded[$start..$end];
        check!($element in encoded);
    };
    ($element:ident in $encoded:ident) => {
        let encoded = &$encoded[..];

        println!(concat!(stringify!($element), " check..."));

        let serialized = certstatus_asn1_der::to_vec(&$element).expect(concat!(
            "failed ",
            stringify!($element),
            " encoding"
        ));
        pretty_assertions::assert_eq!(
            serialized, encoded,
            concat!("encoded ", stringify!($element), " doesn't match")
        );

        let deserialized = certstatus_asn1_der::from_bytes(encoded).expect(concat!(
            "failed ",
            stringify!($element),
            " decoding"
        ));
        pretty_assertions::assert_eq!(
            deserialized, $element,
            concat!("decoded ", stringify!($element), " doesn't match")
        );
    };
}

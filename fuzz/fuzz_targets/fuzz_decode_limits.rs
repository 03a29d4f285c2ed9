#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use zenbound::{Budget, DecodeRequest, ReadFlags, SafetyLimits, Size};

#[derive(Debug, Arbitrary)]
struct Input<'a> {
    flags: i32,
    max_width: u16,
    max_height: u16,
    max_pixels: u32,
    data: &'a [u8],
}

fuzz_target!(|input: Input<'_>| {
    let budget = Budget {
        max_size: Some(Size::new(input.max_width.into(), input.max_height.into())),
        max_pixels: Some(input.max_pixels.into()),
    };
    // Small safety limits keep every successful decode cheap.
    let safety = SafetyLimits {
        max_width: 4096,
        max_height: 4096,
        max_pixels: 1 << 22,
    };

    let result = DecodeRequest::new(input.data)
        .with_flags(ReadFlags::from_bits(input.flags))
        .with_budget(budget)
        .with_safety_limits(safety)
        .decode();

    if let Ok(decoded) = result {
        let size = decoded.info.size();
        assert!(safety.validate(size).is_ok());
        assert!(budget.check(size).is_ok());
        assert!(!decoded.pixels.is_empty());
        // Reduction only shrinks and orientation only transposes.
        let pixels = u64::from(decoded.pixels.width()) * u64::from(decoded.pixels.height());
        assert!(pixels <= size.pixels());
        let (long, short) = (size.width.max(size.height), size.width.min(size.height));
        assert!(decoded.pixels.width().max(decoded.pixels.height()) <= long);
        assert!(decoded.pixels.width().min(decoded.pixels.height()) <= short);
    }
});

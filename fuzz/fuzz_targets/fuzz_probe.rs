#![no_main]

use libfuzzer_sys::fuzz_target;
use zenbound::{ImageFormat, ProbeResult};

fuzz_target!(|data: &[u8]| {
    let _ = ProbeResult::detect(data);
    for format in ImageFormat::ALL {
        let result = ProbeResult::for_format(data, format);
        assert!(result.bytes_examined <= data.len());
    }
});

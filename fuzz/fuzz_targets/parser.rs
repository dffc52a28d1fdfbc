#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|source: &str| {
    // Rendered trees need not parse again, but must never panic
    if let Ok(expression) = plotscript::parse(source) {
        let rendered = expression.to_string();
        let _ = plotscript::parse(&rendered);
    }
});

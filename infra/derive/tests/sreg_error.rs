#[test]
fn sreg_error_ui() {
    let t = trybuild::TestCases::new();
    t.pass("tests/ui/sreg_error_pass.rs");
    t.pass("tests/ui/sreg_error_context.rs");
}

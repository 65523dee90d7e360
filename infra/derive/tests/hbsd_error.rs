#[test]
fn hbsd_error_ui() {
    let t = trybuild::TestCases::new();
    t.pass("tests/ui/hbsd_error_pass.rs");
}

use doorstep_kernel::security::filename::FilenameGuard;

#[test]
fn filename_guard_flattens_and_validates() {
    assert_eq!(FilenameGuard::secure("../../etc/passwd.png").unwrap(), "etc_passwd.png");

    assert_eq!(FilenameGuard::secure("holiday photo.jpg").unwrap(), "holiday_photo.jpg");

    assert!(FilenameGuard::secure("...").is_err());
}

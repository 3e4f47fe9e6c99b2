//! End-to-end editing of a folder of real preview images.

use std::path::Path;

use partbox::Settings;
use partbox::format::SaveOutcome;
use partbox::model::{AddOutcome, PreviewPoint};
use partbox::state::{
    Anchor, Command, CommandOutcome, ImageHeaderProbe, ProjectState, Workspace,
};

fn write_preview(path: &Path) {
    image::RgbImage::new(256, 256).save(path).unwrap();
}

fn open_folder(dir: &Path) -> Workspace {
    let project = ProjectState::from_folder(dir.to_path_buf()).unwrap();
    let settings = Settings {
        source_width: 4096,
        source_height: 4096,
        ..Settings::default()
    };
    Workspace::new(project, settings, ImageHeaderProbe)
}

#[test]
fn test_add_resize_reopen_erase() {
    let dir = tempfile::tempdir().unwrap();
    write_preview(&dir.path().join("mic_001.gif"));
    write_preview(&dir.path().join("mic_002.gif"));
    let box_path = dir.path().join("mic_001.box");

    let mut ws = open_folder(dir.path());
    let report = ws.open_current().unwrap();
    assert_eq!(report.particles, 0);
    assert_eq!(ws.session().unwrap().preview_box(), 8);

    let outcome = ws
        .apply(Command::AddPoint {
            at: PreviewPoint::new(10, 200),
            anchor: Anchor::Corner,
        })
        .unwrap();
    assert_eq!(
        outcome,
        CommandOutcome::Toggled(AddOutcome::Added(PreviewPoint::new(10, 200)))
    );

    ws.apply(Command::SaveStore).unwrap();
    assert_eq!(
        std::fs::read_to_string(&box_path).unwrap(),
        "160     896    128    128\n"
    );

    // growing by 32 moves the corner 16 source pixels down and left
    ws.apply(Command::ResizeBoxTo(160)).unwrap();
    assert_eq!(
        std::fs::read_to_string(&box_path).unwrap(),
        "144     880    160    160\n"
    );

    let settings_path = dir.path().join("settings.txt");
    let settings = ws.close(&settings_path).unwrap();
    assert_eq!(settings.box_size, 160);

    // a fresh workspace picks the box size up from the file itself
    let mut ws = open_folder(dir.path());
    let report = ws.open_current().unwrap();
    assert_eq!(report.particles, 1);
    assert_eq!(report.box_size.get(), 160);
    assert!(ws.session().unwrap().store().contains(PreviewPoint::new(9, 201)));

    let outcome = ws.apply(Command::EraseAt(PreviewPoint::new(9, 201))).unwrap();
    assert_eq!(outcome, CommandOutcome::Erased(vec![PreviewPoint::new(9, 201)]));

    // erasing everything truncates the existing file
    let outcome = ws.apply(Command::SaveStore).unwrap();
    assert_eq!(outcome, CommandOutcome::Saved(Some(SaveOutcome::Written { rows: 0 })));
    assert_eq!(std::fs::read_to_string(&box_path).unwrap(), "");
}

#[test]
fn test_round_trip_is_stable() {
    let dir = tempfile::tempdir().unwrap();
    write_preview(&dir.path().join("mic.gif"));
    let box_path = dir.path().join("mic.box");
    let original = "1000     2000    128    128\n37     4001    128    128\n";
    std::fs::write(&box_path, original).unwrap();

    for _ in 0..3 {
        let mut ws = open_folder(dir.path());
        ws.open_current().unwrap();
        ws.apply(Command::SaveStore).unwrap();
        ws.close(&dir.path().join("settings.txt")).unwrap();
        assert_eq!(std::fs::read_to_string(&box_path).unwrap(), original);
    }
}

#[test]
fn test_malformed_box_file_opens_empty_and_is_kept() {
    let dir = tempfile::tempdir().unwrap();
    write_preview(&dir.path().join("mic.gif"));
    let box_path = dir.path().join("mic.box");
    let contents = "12 abc 128 128\n100 200 128 128\n";
    std::fs::write(&box_path, contents).unwrap();

    let mut ws = open_folder(dir.path());
    let report = ws.open_current().unwrap();
    assert_eq!(report.particles, 0);
    assert!(report.warning.is_some());

    let outcome = ws.apply(Command::SaveStore).unwrap();
    assert_eq!(outcome, CommandOutcome::Saved(Some(SaveOutcome::Skipped)));
    ws.apply(Command::ResizeBoxTo(160)).unwrap();
    ws.close(&dir.path().join("settings.txt")).unwrap();

    assert_eq!(std::fs::read_to_string(&box_path).unwrap(), contents);
}

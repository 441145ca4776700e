//! Cross-module flows: files loaded from disk, merged, edited, closed and
//! written back. Counters are checked against a full rescan after every step.

use std::path::Path;

use crate::catalog::Catalog;
use crate::data_model::DataModel;
use crate::format::{self, ConversionOptions};
use crate::message::{MessageType, TranslatorMessage};
use crate::multi_model::{MultiDataIndex, MultiDataModel};
use crate::text::TextCounts;

const APP_DE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<!DOCTYPE TS>
<TS version="2.1" language="de" sourcelanguage="en">
<context>
    <name>MainWindow</name>
    <message>
        <location filename="../src/main.cpp" line="12"/>
        <source>&amp;File</source>
        <translation>&amp;Datei</translation>
    </message>
    <message>
        <source>Quit</source>
        <translation type="unfinished"></translation>
    </message>
    <message numerus="yes">
        <source>%n file(s)</source>
        <translation>
            <numerusform>%n Datei</numerusform>
            <numerusform>%n Dateien</numerusform>
        </translation>
    </message>
</context>
<context>
    <name>Dialog</name>
    <message>
        <source>Cancel</source>
        <translation type="obsolete">Abbrechen</translation>
    </message>
</context>
</TS>
"#;

const APP_FR: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<!DOCTYPE TS>
<TS version="2.1" language="fr">
<context>
    <name>MainWindow</name>
    <message>
        <source>&amp;File</source>
        <translation type="unfinished">&amp;Fichier</translation>
    </message>
    <message>
        <source>Quit</source>
        <translation>Quitter</translation>
    </message>
</context>
<context>
    <name>Settings</name>
    <message>
        <source>Apply</source>
        <translation>Appliquer</translation>
    </message>
</context>
</TS>
"#;

fn write_file(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

fn load(path: &Path) -> DataModel {
    DataModel::load(path).unwrap().model
}

/// Recomputes every counter from the open files and compares it with the
/// incrementally maintained one.
fn assert_counters_match_rescan(multi: &MultiDataModel) {
    let mut finished_total = 0;
    let mut editable_total = 0;
    let mut message_total = 0;
    for context in 0..multi.context_count() {
        let mc = multi.multi_context_item(context).unwrap();
        let mut finished = 0;
        let mut editable = 0;
        let mut nonobsolete = 0;
        for row in 0..mc.message_count() {
            let mm = mc.multi_message_item(row).unwrap();
            let (mut nonnull, mut live, mut editable_here, mut unfinished) = (0, 0, 0, 0);
            for model in 0..multi.model_count() {
                let Some(m) = multi.message_item(MultiDataIndex::new(model, context, row)) else {
                    continue;
                };
                nonnull += 1;
                if m.is_obsolete() {
                    continue;
                }
                live += 1;
                if multi.is_model_writable(model) {
                    editable_here += 1;
                    if !m.is_finished() {
                        unfinished += 1;
                    }
                }
            }
            assert_eq!(mm.nonnull_count(), nonnull, "{}/{}", mc.context(), mm.text());
            assert_eq!(mm.nonobsolete_count(), live, "{}/{}", mc.context(), mm.text());
            assert_eq!(mm.editable_count(), editable_here, "{}/{}", mc.context(), mm.text());
            assert_eq!(mm.unfinished_count(), unfinished, "{}/{}", mc.context(), mm.text());
            assert!(nonnull > 0, "orphaned row {}/{}", mc.context(), mm.text());
            nonobsolete += live;
            if editable_here > 0 {
                editable += 1;
                if unfinished == 0 {
                    finished += 1;
                }
            }
        }
        assert_eq!(mc.finished_count(), finished, "context {}", mc.context());
        assert_eq!(mc.editable_count(), editable, "context {}", mc.context());
        assert_eq!(mc.nonobsolete_count(), nonobsolete, "context {}", mc.context());
        finished_total += finished;
        editable_total += editable;
        message_total += mc.message_count();
    }
    assert_eq!(multi.finished_count(), finished_total);
    assert_eq!(multi.editable_count(), editable_total);
    assert_eq!(multi.message_count(), message_total);
}

#[test]
fn test_counters_follow_append_and_close() {
    let dir = tempfile::tempdir().unwrap();
    let de = write_file(dir.path(), "app_de.ts", APP_DE);
    let fr = write_file(dir.path(), "app_fr.ts", APP_FR);

    let mut multi = MultiDataModel::new();
    multi.append(load(&de), true);
    assert_counters_match_rescan(&multi);
    multi.append(load(&fr), true);
    assert_counters_match_rescan(&multi);
    assert_eq!(multi.context_count(), 3);
    assert_eq!(multi.message_count(), 5);

    // read-only copy of the first file joins without editable weight
    multi.append(load(&de), false);
    assert_counters_match_rescan(&multi);
    assert_eq!(multi.message_count(), 5);

    multi.close(0).unwrap();
    assert_counters_match_rescan(&multi);
    multi.move_model(1, 0).unwrap();
    assert_counters_match_rescan(&multi);
    multi.close(1).unwrap();
    assert_counters_match_rescan(&multi);
    assert_eq!(multi.model_count(), 1);
    // only the German file is left, so the Settings context is gone
    assert!(multi.find_context("Settings").is_none());
    assert_eq!(multi.message_count(), 4);

    multi.close(0).unwrap();
    assert_counters_match_rescan(&multi);
    assert_eq!(multi.context_count(), 0);
}

#[test]
fn test_set_finished_round_trip_restores_counters() {
    let dir = tempfile::tempdir().unwrap();
    let de = write_file(dir.path(), "app_de.ts", APP_DE);
    let fr = write_file(dir.path(), "app_fr.ts", APP_FR);
    let mut multi = MultiDataModel::new();
    multi.append(load(&de), true);
    multi.append(load(&fr), true);

    let context = multi.find_context_index("MainWindow").unwrap();
    let quit = multi
        .find_context("MainWindow")
        .and_then(|mc| mc.find_message("Quit", ""))
        .unwrap();
    let index = MultiDataIndex::new(0, context, quit);
    let before = (multi.finished_count(), multi.editable_count());
    let context_before = multi.context_item(index).unwrap().finished_count();

    multi.set_finished(index, true).unwrap();
    assert_counters_match_rescan(&multi);
    assert_eq!(multi.finished_count(), before.0 + 1);

    multi.set_finished(index, false).unwrap();
    assert_counters_match_rescan(&multi);
    assert_eq!((multi.finished_count(), multi.editable_count()), before);
    assert_eq!(multi.context_item(index).unwrap().finished_count(), context_before);
    // the toggle itself is an edit
    assert!(multi.is_modified());
}

#[test]
fn test_identical_file_adds_no_rows() {
    let dir = tempfile::tempdir().unwrap();
    let de = write_file(dir.path(), "app_de.ts", APP_DE);
    let mut multi = MultiDataModel::new();
    multi.append(load(&de), true);
    let rows = multi.message_count();
    let contexts = multi.context_count();
    assert!(multi.is_well_mergeable(&load(&de)));
    multi.append(load(&de), true);
    assert_eq!(multi.message_count(), rows);
    assert_eq!(multi.context_count(), contexts);
    assert_counters_match_rescan(&multi);
}

fn single_message_model(file: &str, context: &str, source: &str) -> DataModel {
    let mut catalog = Catalog::new();
    catalog.append(TranslatorMessage::new(context, source, "").with_type(MessageType::Finished));
    catalog.language_code = "de".to_string();
    DataModel::from_catalog(catalog, Path::new(file)).unwrap().model
}

#[test]
fn test_mergeability() {
    let a = single_message_model("a_de.ts", "A", "one");
    let b = single_message_model("b_de.ts", "B", "two");
    assert!(!a.is_well_mergeable(&b));
    assert!(a.is_well_mergeable(&a.clone()));
    assert!(DataModel::new().is_well_mergeable(&DataModel::new()));
    assert!(a.is_well_mergeable(&DataModel::new()));

    let mut multi = MultiDataModel::new();
    assert!(multi.is_well_mergeable(&a));
    multi.append(a, true);
    assert!(!multi.is_well_mergeable(&b));
}

#[test]
fn test_edit_save_reload() {
    let dir = tempfile::tempdir().unwrap();
    let de = write_file(dir.path(), "app_de.ts", APP_DE);
    let mut multi = MultiDataModel::new();
    multi.append(load(&de), true);

    let context = multi.find_context_index("MainWindow").unwrap();
    let quit = multi
        .find_context("MainWindow")
        .and_then(|mc| mc.find_message("Quit", ""))
        .unwrap();
    let index = MultiDataIndex::new(0, context, quit);
    multi.set_translation(index, "Beenden").unwrap();
    multi.set_finished(index, true).unwrap();
    let copy = dir.path().join("copy_de.ts");
    multi.save_as(0, &copy).unwrap();
    assert!(!multi.is_modified());
    assert_eq!(multi.is_file_loaded(&copy), Some(0));

    let reloaded = load(&copy);
    let item = reloaded.find_message("MainWindow", "Quit", "").unwrap();
    assert_eq!(item.translation(), "Beenden");
    assert!(item.is_finished());
    let plural = reloaded.find_message("MainWindow", "%n file(s)", "").unwrap();
    assert_eq!(plural.translations(), vec!["%n Datei", "%n Dateien"]);
    assert!(reloaded.find_message("Dialog", "Cancel", "").unwrap().is_obsolete());
    assert_eq!(reloaded.language_code(), "de");
    assert_eq!(reloaded.source_language_code(), "en");
}

#[test]
fn test_qph_round_trip_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let mut catalog = Catalog::new();
    catalog.language_code = "fr".to_string();
    catalog.append(
        TranslatorMessage::new("", "Save <all> & \"quit\"", "menu 'file'")
            .with_translation("Tout <enregistrer> & quitter")
            .with_type(MessageType::Finished),
    );
    let path = dir.path().join("glossary.qph");
    format::save_catalog(&catalog, &path, &ConversionOptions::default()).unwrap();

    let loaded = format::load_catalog(&path).unwrap();
    let phrase = loaded.message(0).unwrap();
    assert_eq!(phrase.source_text, "Save <all> & \"quit\"");
    assert_eq!(phrase.translation(), "Tout <enregistrer> & quitter");
    assert_eq!(phrase.comment, "menu 'file'");
    assert_eq!(loaded.language_code, "fr");

    // saving again gives identical bytes
    let again = dir.path().join("again.qph");
    format::save_catalog(&loaded, &again, &ConversionOptions::default()).unwrap();
    assert_eq!(std::fs::read(&path).unwrap(), std::fs::read(&again).unwrap());
}

#[test]
fn test_release_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let de = write_file(dir.path(), "app_de.ts", APP_DE);
    let model = load(&de);
    let qm = dir.path().join("app_de.qm");
    let report = model
        .release(&qm, false, false, crate::format::SaveMode::Everything)
        .unwrap();
    // "&File" and the plural message; "Quit" is empty and unfinished
    assert_eq!(report.finished, 2);
    assert_eq!(report.untranslated, 1);
    let bytes = std::fs::read(&qm).unwrap();
    assert!(bytes.starts_with(&crate::format::qm::QM_MAGIC));
}

#[test]
fn test_word_counts() {
    let counts = TextCounts::of("ab cd");
    assert_eq!((counts.words, counts.chars, counts.chars_with_space), (2, 4, 5));
}

use std::path::Path;

use linguist_model::{
    Catalog, CellData, DataModel, MessageModel, MessageType, MultiDataModel, Role, TranslatorMessage, ViewIndex,
    ViewItem,
};

fn catalog(language: &str, entries: &[(&str, &str, &str, MessageType)]) -> Catalog {
    let mut catalog = Catalog::new();
    catalog.language_code = language.to_string();
    for &(context, source, translation, message_type) in entries {
        catalog.append(
            TranslatorMessage::new(context, source, "")
                .with_translation(translation)
                .with_type(message_type),
        );
    }
    catalog
}

fn text(view: &MessageModel<'_>, item: ViewItem, column: usize) -> String {
    match view.data(ViewIndex { item, column }, Role::Display) {
        Some(CellData::Text(text)) => text,
        _ => String::new(),
    }
}

fn marks(view: &MessageModel<'_>, item: ViewItem, files: usize) -> String {
    (1..=files)
        .map(|column| match view.data(ViewIndex { item, column }, Role::Decoration) {
            Some(CellData::Mark(mark)) => format!("{:<9}", mark.name()),
            _ => " ".repeat(9),
        })
        .collect()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Example usage: two translations of the same program side by side
    let de = catalog(
        "de",
        &[
            ("MainWindow", "&Open", "Ö&ffnen", MessageType::Finished),
            ("MainWindow", "Quit", "", MessageType::Unfinished),
        ],
    );
    let pl = catalog(
        "pl",
        &[
            ("MainWindow", "&Open", "&Otwórz", MessageType::Finished),
            ("MainWindow", "Quit", "Zakończ", MessageType::Finished),
            ("Settings", "Apply", "Zastosuj", MessageType::Unfinished),
        ],
    );

    let mut session = MultiDataModel::new();
    session.append(DataModel::from_catalog(de, Path::new("app_de.ts"))?.model, true);
    session.append(DataModel::from_catalog(pl, Path::new("app_pl.ts"))?.model, true);

    println!("Files: {}", session.condensed_src_file_names(false));
    for model in session.models() {
        println!(
            "  {} ({}): plural forms {:?}",
            model.display_file_name(false),
            model.localized_language(),
            model.numerus_forms()
        );
    }

    let view = MessageModel::new(&session);
    let files = session.model_count();
    for row in 0..view.row_count(None) {
        let context = ViewItem::Context { row };
        println!(
            "{:<24}{}{}",
            text(&view, context, 0),
            marks(&view, context, files),
            text(&view, context, files + 1)
        );
        for message in 0..view.row_count(Some(context)) {
            let item = ViewItem::Message { context: row, row: message };
            println!("  {:<22}{}", text(&view, item, 0), marks(&view, item, files));
        }
    }

    let stats = session.statistics();
    println!(
        "Finished: {}/{} ({}%)",
        session.finished_count(),
        session.editable_count(),
        stats.percent_finished()
    );
    println!("Source words: {}", stats.source.words);
    Ok(())
}

//! Qt Linguist translation sources (`.ts`), format version 2.1.

use std::collections::HashMap;
use std::path::Path;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use super::{CatalogFormat, ConversionOptions};
use crate::catalog::{Catalog, LocationsType};
use crate::error::{LinguistError, Result};
use crate::message::{
    BINARY_VARIANT_SEPARATOR, CONTEXT_COMMENT, Location, MessageType, TranslatorMessage,
};
use crate::text::protect;

pub struct TsFormat;

/// Extra key holding the PO plural source text
const PO_MSGID_PLURAL: &str = "po-msgid_plural";

fn attribute(start: &BytesStart<'_>, name: &[u8], path: &Path) -> Result<Option<String>> {
    for attr in start.attributes() {
        let attr = attr.map_err(|e| LinguistError::parse(path, e.to_string()))?;
        if attr.key.as_ref() == name {
            let value = attr
                .unescape_value()
                .map_err(|e| LinguistError::parse(path, e.to_string()))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

fn element_name(name: &[u8]) -> &str {
    std::str::from_utf8(name).unwrap_or("")
}

/// Value of a `<byte value="x1b"/>` element, hex with an `x` prefix or decimal.
fn byte_value(value: &str) -> Option<char> {
    let code = match value.strip_prefix('x') {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => value.parse().ok()?,
    };
    char::from_u32(code)
}

struct TsReader<'a> {
    path: &'a Path,
    catalog: Catalog,
    context: String,
    message: Option<TranslatorMessage>,
    text: String,
    variants: Vec<String>,
    numerus_forms: Vec<String>,
    current_file: String,
    // last line per file, relative locations count from here
    lines: HashMap<String, i32>,
    relative: bool,
    absolute: bool,
}

impl<'a> TsReader<'a> {
    fn new(path: &'a Path) -> Self {
        TsReader {
            path,
            catalog: Catalog::new(),
            context: String::new(),
            message: None,
            text: String::new(),
            variants: Vec::new(),
            numerus_forms: Vec::new(),
            current_file: String::new(),
            lines: HashMap::new(),
            relative: false,
            absolute: false,
        }
    }

    fn take_variant_text(&mut self) -> String {
        if self.variants.is_empty() {
            std::mem::take(&mut self.text)
        } else {
            let joined = self.variants.join(&BINARY_VARIANT_SEPARATOR.to_string());
            self.variants.clear();
            joined
        }
    }

    fn start(&mut self, e: &BytesStart<'_>) -> Result<()> {
        self.text.clear();
        match e.name().as_ref() {
            b"TS" => {
                if let Some(lang) = attribute(e, b"language", self.path)? {
                    self.catalog.language_code = lang;
                }
                if let Some(lang) = attribute(e, b"sourcelanguage", self.path)? {
                    self.catalog.source_language_code = lang;
                }
            }
            b"context" => {
                self.context.clear();
                self.current_file.clear();
                self.lines.clear();
            }
            b"message" => {
                let mut msg = TranslatorMessage::new(&self.context, "", "");
                msg.id = attribute(e, b"id", self.path)?.unwrap_or_default();
                msg.plural = attribute(e, b"numerus", self.path)?.as_deref() == Some("yes");
                self.message = Some(msg);
            }
            b"translation" => {
                self.variants.clear();
                self.numerus_forms.clear();
                let kind = attribute(e, b"type", self.path)?;
                if let Some(msg) = self.message.as_mut() {
                    msg.message_type = MessageType::from_ts_attribute(kind.as_deref());
                }
            }
            b"numerusform" => self.variants.clear(),
            b"location" => self.location(e)?,
            _ => {}
        }
        Ok(())
    }

    fn location(&mut self, e: &BytesStart<'_>) -> Result<()> {
        let file_name = attribute(e, b"filename", self.path)?.unwrap_or_else(|| self.current_file.clone());
        let line_attr = attribute(e, b"line", self.path)?.unwrap_or_default();
        let previous = self.lines.get(&file_name).copied().unwrap_or(0);
        let bad_line = || LinguistError::parse(self.path, format!("invalid location line '{}'", line_attr));
        let line = if line_attr.is_empty() {
            previous
        } else if line_attr.starts_with(['+', '-']) {
            self.relative = true;
            previous + line_attr.parse::<i32>().map_err(|_| bad_line())?
        } else {
            self.absolute = true;
            line_attr.parse::<i32>().map_err(|_| bad_line())?
        };
        self.lines.insert(file_name.clone(), line);
        self.current_file = file_name.clone();
        if let Some(msg) = self.message.as_mut() {
            msg.locations.push(Location { file_name, line });
        }
        Ok(())
    }

    fn end(&mut self, name: &[u8]) {
        match name {
            b"name" if self.message.is_none() => self.context = std::mem::take(&mut self.text),
            b"comment" if self.message.is_none() => {
                let mut msg = TranslatorMessage::new(&self.context, CONTEXT_COMMENT, "");
                msg.comment = std::mem::take(&mut self.text);
                self.catalog.append(msg);
            }
            b"message" => {
                if let Some(msg) = self.message.take() {
                    self.catalog.append(msg);
                }
            }
            b"lengthvariant" => {
                let variant = std::mem::take(&mut self.text);
                self.variants.push(variant);
            }
            b"numerusform" => {
                let form = self.take_variant_text();
                self.numerus_forms.push(form);
            }
            b"translation" => {
                let translations = if self.numerus_forms.is_empty() {
                    vec![self.take_variant_text()]
                } else {
                    std::mem::take(&mut self.numerus_forms)
                };
                if let Some(msg) = self.message.as_mut() {
                    msg.translations = translations;
                }
            }
            _ => {
                let text = std::mem::take(&mut self.text);
                let Some(msg) = self.message.as_mut() else {
                    if let Some(key) = name.strip_prefix(b"extra-") {
                        self.catalog.extras.insert(element_name(key).to_string(), text);
                    }
                    return;
                };
                match name {
                    b"source" => msg.source_text = text,
                    b"oldsource" => msg.old_source_text = text,
                    b"comment" => msg.comment = text,
                    b"oldcomment" => msg.old_comment = text,
                    b"extracomment" => msg.extra_comment = text,
                    b"translatorcomment" => msg.translator_comment = text,
                    _ => {
                        if let Some(key) = name.strip_prefix(b"extra-") {
                            let key = element_name(key);
                            if key == PO_MSGID_PLURAL {
                                msg.plural_source_text = text;
                            } else {
                                msg.extras.insert(key.to_string(), text);
                            }
                        }
                    }
                }
            }
        }
    }

    fn finish(mut self) -> Catalog {
        self.catalog.locations_type = if self.relative {
            LocationsType::RelativeLocations
        } else if self.absolute {
            LocationsType::AbsoluteLocations
        } else {
            LocationsType::NoLocations
        };
        self.catalog
    }
}

/// Parses a translation source file.
pub fn read_ts(content: &str, path: &Path) -> Result<Catalog> {
    let mut reader = Reader::from_str(content);
    let mut state = TsReader::new(path);

    loop {
        let event = reader.read_event().map_err(|e| {
            LinguistError::parse(path, format!("{} (at byte {})", e, reader.buffer_position()))
        })?;
        match event {
            Event::Start(e) => state.start(&e)?,
            Event::Empty(e) => {
                if e.name().as_ref() == b"byte" {
                    let value = attribute(&e, b"value", path)?.unwrap_or_default();
                    let c = byte_value(&value).ok_or_else(|| {
                        LinguistError::parse(path, format!("invalid byte value '{}'", value))
                    })?;
                    state.text.push(c);
                } else {
                    state.start(&e)?;
                    state.end(e.name().as_ref());
                }
            }
            Event::End(e) => state.end(e.name().as_ref()),
            Event::Text(e) => {
                let text = e
                    .unescape()
                    .map_err(|e| LinguistError::parse(path, e.to_string()))?;
                state.text.push_str(&text);
            }
            Event::CData(e) => state.text.push_str(&String::from_utf8_lossy(&e.into_inner())),
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(state.finish())
}

struct TsWriter<'a> {
    writer: Writer<Vec<u8>>,
    path: &'a Path,
}

impl TsWriter<'_> {
    fn event(&mut self, event: Event<'_>) -> Result<()> {
        self.writer
            .write_event(event)
            .map_err(|e| LinguistError::parse(self.path, format!("cannot write XML: {}", e)))
    }

    fn start(&mut self, name: &str, attributes: &[(&str, &str)]) -> Result<()> {
        let start = BytesStart::new(name).with_attributes(attributes.iter().copied());
        self.event(Event::Start(start))
    }

    fn end(&mut self, name: &str) -> Result<()> {
        self.event(Event::End(BytesEnd::new(name)))
    }

    fn text(&mut self, text: &str) -> Result<()> {
        self.event(Event::Text(BytesText::from_escaped(protect(text))))
    }

    fn text_element(&mut self, name: &str, attributes: &[(&str, &str)], text: &str) -> Result<()> {
        self.start(name, attributes)?;
        self.text(text)?;
        self.end(name)
    }

    fn optional_element(&mut self, name: &str, text: &str) -> Result<()> {
        if text.is_empty() {
            return Ok(());
        }
        self.text_element(name, &[], text)
    }

    /// Writes a translation, splitting length variants into child elements.
    fn variants_element(&mut self, name: &str, attributes: &[(&str, &str)], text: &str) -> Result<()> {
        if !text.contains(BINARY_VARIANT_SEPARATOR) {
            return self.text_element(name, attributes, text);
        }
        let mut attrs = attributes.to_vec();
        attrs.push(("variants", "yes"));
        self.start(name, &attrs)?;
        for variant in text.split(BINARY_VARIANT_SEPARATOR) {
            self.text_element("lengthvariant", &[], variant)?;
        }
        self.end(name)
    }

    fn locations(
        &mut self,
        msg: &TranslatorMessage,
        locations_type: LocationsType,
        current_file: &mut String,
        lines: &mut HashMap<String, i32>,
    ) -> Result<()> {
        for location in &msg.locations {
            let mut start = BytesStart::new("location");
            match locations_type {
                LocationsType::NoLocations => return Ok(()),
                LocationsType::AbsoluteLocations => {
                    start.push_attribute(("filename", location.file_name.as_str()));
                    start.push_attribute(("line", location.line.to_string().as_str()));
                }
                LocationsType::RelativeLocations => {
                    if *current_file != location.file_name {
                        start.push_attribute(("filename", location.file_name.as_str()));
                        *current_file = location.file_name.clone();
                    }
                    let previous = lines.insert(location.file_name.clone(), location.line);
                    let delta = location.line - previous.unwrap_or(0);
                    start.push_attribute(("line", format!("{:+}", delta).as_str()));
                }
            }
            self.event(Event::Empty(start))?;
        }
        Ok(())
    }

    fn message(
        &mut self,
        msg: &TranslatorMessage,
        locations_type: LocationsType,
        current_file: &mut String,
        lines: &mut HashMap<String, i32>,
    ) -> Result<()> {
        let mut attrs: Vec<(&str, &str)> = Vec::new();
        if !msg.id.is_empty() {
            attrs.push(("id", msg.id.as_str()));
        }
        if msg.plural {
            attrs.push(("numerus", "yes"));
        }
        self.start("message", &attrs)?;
        self.locations(msg, locations_type, current_file, lines)?;
        self.text_element("source", &[], &msg.source_text)?;
        self.optional_element("oldsource", &msg.old_source_text)?;
        self.optional_element("comment", &msg.comment)?;
        self.optional_element("oldcomment", &msg.old_comment)?;
        self.optional_element("extracomment", &msg.extra_comment)?;
        self.optional_element("translatorcomment", &msg.translator_comment)?;

        let type_attrs: Vec<(&str, &str)> = msg
            .message_type
            .ts_attribute()
            .map(|kind| vec![("type", kind)])
            .unwrap_or_default();
        if msg.plural {
            self.start("translation", &type_attrs)?;
            for form in &msg.translations {
                self.variants_element("numerusform", &[], form)?;
            }
            self.end("translation")?;
        } else {
            self.variants_element("translation", &type_attrs, msg.translation())?;
        }

        if !msg.plural_source_text.is_empty() {
            self.text_element(&format!("extra-{}", PO_MSGID_PLURAL), &[], &msg.plural_source_text)?;
        }
        for (key, value) in &msg.extras {
            self.text_element(&format!("extra-{}", key), &[], value)?;
        }
        self.end("message")
    }
}

/// Serializes a catalog as a translation source file. Messages are grouped
/// by context in order of first appearance.
pub fn write_ts(catalog: &Catalog, path: &Path) -> Result<Vec<u8>> {
    let mut out = TsWriter {
        writer: Writer::new_with_indent(Vec::new(), b' ', 4),
        path,
    };
    out.event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
    out.event(Event::DocType(BytesText::from_escaped("TS")))?;

    let mut ts_attrs = vec![("version", "2.1")];
    if !catalog.language_code.is_empty() {
        ts_attrs.push(("language", catalog.language_code.as_str()));
    }
    if !catalog.source_language_code.is_empty() {
        ts_attrs.push(("sourcelanguage", catalog.source_language_code.as_str()));
    }
    out.start("TS", &ts_attrs)?;
    for (key, value) in &catalog.extras {
        out.text_element(&format!("extra-{}", key), &[], value)?;
    }

    let mut contexts: Vec<(&str, Vec<&TranslatorMessage>)> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();
    for msg in catalog.messages() {
        let pos = *positions.entry(msg.context.as_str()).or_insert_with(|| {
            contexts.push((msg.context.as_str(), Vec::new()));
            contexts.len() - 1
        });
        contexts[pos].1.push(msg);
    }

    for (name, messages) in contexts {
        out.start("context", &[])?;
        out.text_element("name", &[], name)?;
        for msg in messages.iter().filter(|m| m.is_context_comment()) {
            out.text_element("comment", &[], &msg.comment)?;
        }
        let mut current_file = String::new();
        let mut lines = HashMap::new();
        for msg in messages.iter().filter(|m| !m.is_context_comment()) {
            out.message(msg, catalog.locations_type, &mut current_file, &mut lines)?;
        }
        out.end("context")?;
    }
    out.end("TS")?;

    let mut data = out.writer.into_inner();
    data.push(b'\n');
    Ok(data)
}

impl CatalogFormat for TsFormat {
    fn extension(&self) -> &'static str {
        "ts"
    }

    fn description(&self) -> &'static str {
        "Qt translation sources (format 2.1)"
    }

    fn load(&self, data: &[u8], path: &Path) -> Result<Catalog> {
        let content = std::str::from_utf8(data)
            .map_err(|e| LinguistError::parse(path, format!("invalid UTF-8: {}", e)))?;
        read_ts(content, path)
    }

    fn save(&self, catalog: &Catalog, _options: &ConversionOptions, path: &Path) -> Result<Vec<u8>> {
        write_ts(catalog, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<!DOCTYPE TS>
<TS version="2.1" language="de" sourcelanguage="en">
<extra-project>demo</extra-project>
<context>
    <name>MainWindow</name>
    <comment>The main application window</comment>
    <message>
        <location filename="mainwindow.cpp" line="+12"/>
        <location line="+3"/>
        <source>&amp;Open</source>
        <comment>menu</comment>
        <translation>Ö&amp;ffnen</translation>
    </message>
    <message numerus="yes">
        <location filename="mainwindow.cpp" line="+10"/>
        <source>%n file(s)</source>
        <translation type="unfinished">
            <numerusform>%n Datei</numerusform>
            <numerusform></numerusform>
        </translation>
        <extra-po-msgid_plural>%n files</extra-po-msgid_plural>
    </message>
    <message>
        <source>Gone</source>
        <translation type="obsolete">Weg</translation>
    </message>
</context>
<context>
    <name>Dialog</name>
    <message id="dlg.title">
        <location filename="dialog.cpp" line="+5"/>
        <source>Title</source>
        <extracomment>Window title</extracomment>
        <translatorcomment>keep short</translatorcomment>
        <translation variants="yes"><lengthvariant>Überschrift</lengthvariant><lengthvariant>Titel</lengthvariant></translation>
        <extra-flag>x</extra-flag>
    </message>
</context>
</TS>
"#;

    #[test]
    fn test_read_ts() {
        let catalog = read_ts(SAMPLE, Path::new("app_de.ts")).unwrap();
        assert_eq!(catalog.language_code, "de");
        assert_eq!(catalog.source_language_code, "en");
        assert_eq!(catalog.locations_type, LocationsType::RelativeLocations);
        assert_eq!(catalog.extras.get("project").map(String::as_str), Some("demo"));
        assert_eq!(catalog.message_count(), 5);

        let messages = catalog.messages();
        assert!(messages[0].is_context_comment());
        assert_eq!(messages[0].context, "MainWindow");
        assert_eq!(messages[0].comment, "The main application window");

        let open = &messages[1];
        assert_eq!(open.source_text, "&Open");
        assert_eq!(open.comment, "menu");
        assert_eq!(open.translation(), "Ö&ffnen");
        assert_eq!(open.message_type, MessageType::Finished);
        assert_eq!(
            open.locations,
            vec![
                Location { file_name: "mainwindow.cpp".to_string(), line: 12 },
                Location { file_name: "mainwindow.cpp".to_string(), line: 15 },
            ]
        );

        let files = &messages[2];
        assert!(files.plural);
        assert_eq!(files.message_type, MessageType::Unfinished);
        assert_eq!(files.translations, vec!["%n Datei".to_string(), String::new()]);
        assert_eq!(files.plural_source_text, "%n files");
        assert_eq!(files.locations[0].line, 25);

        assert_eq!(messages[3].message_type, MessageType::Obsolete);

        let title = &messages[4];
        assert_eq!(title.context, "Dialog");
        assert_eq!(title.id, "dlg.title");
        assert_eq!(title.extra_comment, "Window title");
        assert_eq!(title.translator_comment, "keep short");
        assert_eq!(
            title.translation(),
            format!("Überschrift{}Titel", BINARY_VARIANT_SEPARATOR)
        );
        assert_eq!(title.extras.get("flag").map(String::as_str), Some("x"));
        // relative lines restart in every context
        assert_eq!(title.locations[0].line, 5);
    }

    #[test]
    fn test_write_then_read_preserves_catalog() {
        let catalog = read_ts(SAMPLE, Path::new("app_de.ts")).unwrap();
        let written = write_ts(&catalog, Path::new("out.ts")).unwrap();
        let text = String::from_utf8(written).unwrap();
        assert!(text.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>"));
        assert!(text.contains("<!DOCTYPE TS>"));
        assert!(text.contains("<source>&amp;Open</source>"));
        assert!(text.contains("line=\"+3\""));

        let again = read_ts(&text, Path::new("out.ts")).unwrap();
        assert_eq!(again, catalog);
    }

    #[test]
    fn test_absolute_locations() {
        let mut catalog = Catalog::new();
        catalog.locations_type = LocationsType::AbsoluteLocations;
        let mut msg = TranslatorMessage::new("C", "Hello", "");
        msg.locations.push(Location { file_name: "main.cpp".to_string(), line: 42 });
        catalog.append(msg);

        let text = String::from_utf8(write_ts(&catalog, Path::new("x.ts")).unwrap()).unwrap();
        assert!(text.contains(r#"<location filename="main.cpp" line="42"/>"#));
        assert!(text.contains(r#"<translation type="unfinished"></translation>"#));

        let again = read_ts(&text, Path::new("x.ts")).unwrap();
        assert_eq!(again.locations_type, LocationsType::AbsoluteLocations);
        assert_eq!(again.messages()[0].locations[0].line, 42);
        assert_eq!(again.messages()[0].translations, vec![String::new()]);
    }

    #[test]
    fn test_byte_elements_and_control_characters() {
        let doc = r#"<TS><context><name>C</name><message><source>a<byte value="x7"/>b</source><translation>c&#1;d</translation></message></context></TS>"#;
        let catalog = read_ts(doc, Path::new("x.ts")).unwrap();
        assert_eq!(catalog.messages()[0].source_text, "a\u{7}b");
        assert_eq!(catalog.messages()[0].translation(), "c\u{1}d");
        assert_eq!(catalog.locations_type, LocationsType::NoLocations);
    }

    #[test]
    fn test_malformed_ts() {
        let err = read_ts("<TS><context><name>C</context></TS>", Path::new("bad.ts")).unwrap_err();
        assert!(matches!(err, LinguistError::Parse { .. }));

        let err = read_ts(
            r#"<TS><context><name>C</name><message><location filename="a" line="+x"/></message></context></TS>"#,
            Path::new("bad.ts"),
        )
        .unwrap_err();
        assert!(err.to_string().contains("invalid location line"));
    }
}

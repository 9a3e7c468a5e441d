//! Translation of a [`ToastTemplate`] into the platform toast schema.
//!
//! The document starts from the legacy template skeleton of the chosen
//! [`TemplateType`](crate::template::TemplateType) and is then enriched with the
//! optional nodes. Attribution, actions, audio, duration and scenario are only
//! understood by modern platforms and are skipped when `modern` is false.
//!
//! <https://learn.microsoft.com/en-us/uwp/schemas/tiles/toastschema/schema-root>

use quick_xml::{
    Writer,
    events::{BytesEnd, BytesStart, BytesText, Event},
};
use thiserror::Error;

use crate::template::{AudioOption, ToastTemplate};

#[derive(Error, Debug)]
#[error("failed to serialize toast xml: {0}")]
pub struct XmlError(String);

#[derive(Debug, Clone, PartialEq, Eq)]
enum Node {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Element {
    name: &'static str,
    attributes: Vec<(&'static str, String)>,
    children: Vec<Node>,
}

impl Element {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    fn with_attr(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.set_attr(key, value);
        self
    }

    /// Replaces the attribute if it is already present.
    fn set_attr(&mut self, key: &'static str, value: impl Into<String>) {
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == key) {
            Some((_, v)) => *v = value,
            None => self.attributes.push((key, value)),
        }
    }

    fn with_text(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        if !text.is_empty() {
            self.children.push(Node::Text(text));
        }
        self
    }

    fn push(&mut self, child: Element) {
        self.children.push(Node::Element(child));
    }

    fn child_mut(&mut self, name: &str) -> Option<&mut Element> {
        self.children.iter_mut().find_map(|node| match node {
            Node::Element(e) if e.name == name => Some(e),
            _ => None,
        })
    }

    fn write(&self, writer: &mut Writer<Vec<u8>>) -> Result<(), XmlError> {
        let mut start = BytesStart::new(self.name);
        for (key, value) in &self.attributes {
            start.push_attribute((*key, value.as_str()));
        }

        if self.children.is_empty() {
            return writer
                .write_event(Event::Empty(start))
                .map_err(|e| XmlError(e.to_string()));
        }

        writer
            .write_event(Event::Start(start))
            .map_err(|e| XmlError(e.to_string()))?;
        for child in &self.children {
            match child {
                Node::Element(e) => e.write(writer)?,
                Node::Text(t) => writer
                    .write_event(Event::Text(BytesText::new(t)))
                    .map_err(|e| XmlError(e.to_string()))?,
            }
        }
        writer
            .write_event(Event::End(BytesEnd::new(self.name)))
            .map_err(|e| XmlError(e.to_string()))
    }
}

/// The `<toast>` document for one notification.
#[derive(Debug, Clone)]
pub struct ToastXml {
    root: Element,
}

impl ToastXml {
    /// Builds the document for `template`.
    pub fn build(template: &ToastTemplate, modern: bool) -> Self {
        let mut xml = Self::skeleton(template);

        if modern {
            if !template.attribution_text().is_empty() {
                xml.add_attribution(template.attribution_text());
            }

            for (index, label) in template.actions().iter().enumerate() {
                xml.add_action(label, &index.to_string());
            }

            if !template.audio_path().is_empty() || template.audio_option() != AudioOption::Default
            {
                xml.set_audio(template.audio_path(), template.audio_option());
            }

            if let Some(duration) = template.duration().as_attr() {
                xml.root.set_attr("duration", duration);
            }

            if let Some(scenario) = template.scenario().as_attr() {
                xml.root.set_attr("scenario", scenario);
            }
        } else {
            tracing::debug!(
                target: "toast::xml",
                "Modern features (actions, audio, attribution) not supported on this OS"
            );
        }

        xml
    }

    /// Legacy layout: one `<binding>` with an optional image and the text lines.
    fn skeleton(template: &ToastTemplate) -> Self {
        let ty = template.template_type();
        let mut binding = Element::new("binding").with_attr("template", ty.as_str());

        if ty.has_image() {
            binding.push(
                Element::new("image")
                    .with_attr("id", "1")
                    .with_attr("src", image_uri(template.image_path())),
            );
        }

        for (index, line) in template.text_fields().iter().enumerate() {
            binding.push(
                Element::new("text")
                    .with_attr("id", (index + 1).to_string())
                    .with_text(line.as_str()),
            );
        }

        let mut visual = Element::new("visual");
        visual.push(binding);
        let mut root = Element::new("toast");
        root.push(visual);

        Self { root }
    }

    fn binding_mut(&mut self) -> Option<&mut Element> {
        self.root.child_mut("visual")?.child_mut("binding")
    }

    fn add_attribution(&mut self, text: &str) {
        if let Some(binding) = self.binding_mut() {
            binding.push(
                Element::new("text")
                    .with_attr("placement", "attribution")
                    .with_text(text),
            );
        }
    }

    /// The first action switches the toast to the generic template with a long
    /// duration, as buttons are not part of the legacy layouts.
    fn add_action(&mut self, content: &str, arguments: &str) {
        if self.root.child_mut("actions").is_none() {
            self.root.set_attr("template", "ToastGeneric");
            self.root.set_attr("duration", "long");
            self.root.push(Element::new("actions"));
        }

        if let Some(actions) = self.root.child_mut("actions") {
            actions.push(
                Element::new("action")
                    .with_attr("content", content)
                    .with_attr("arguments", arguments),
            );
        }
    }

    fn set_audio(&mut self, path: &str, option: AudioOption) {
        let mut audio = Element::new("audio");
        if !path.is_empty() {
            audio.set_attr("src", path);
        }
        match option {
            AudioOption::Loop => audio.set_attr("loop", "true"),
            AudioOption::Silent => audio.set_attr("silent", "true"),
            AudioOption::Default => {}
        }
        self.root.push(audio);
    }

    pub fn to_xml(&self) -> Result<String, XmlError> {
        let mut writer = Writer::new(Vec::new());
        self.root.write(&mut writer)?;
        String::from_utf8(writer.into_inner()).map_err(|e| XmlError(e.to_string()))
    }
}

/// Image sources are file URIs unless the caller already passed a URI.
fn image_uri(path: &str) -> String {
    if path.is_empty() || path.contains("://") || path.starts_with("ms-app") {
        path.to_string()
    } else {
        format!("file:///{}", path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::{Duration, Scenario, TemplateType};

    fn render(template: &ToastTemplate, modern: bool) -> String {
        ToastXml::build(template, modern).to_xml().unwrap()
    }

    #[test]
    fn test_text_template_skeleton() {
        let mut toast = ToastTemplate::new(TemplateType::Text02);
        toast.set_first_line("Title").set_second_line("Body");

        assert_eq!(
            render(&toast, true),
            r#"<toast><visual><binding template="ToastText02"><text id="1">Title</text><text id="2">Body</text></binding></visual></toast>"#
        );
    }

    #[test]
    fn test_image_template_sets_file_uri() {
        let mut toast = ToastTemplate::new(TemplateType::ImageAndText01);
        toast.set_first_line("Hi").set_image_path("D:/pic.png");

        let xml = render(&toast, false);
        assert!(xml.contains(r#"<binding template="ToastImageAndText01"><image id="1" src="file:///D:/pic.png"/>"#));

        toast.set_image_path("ms-appx:///Assets/logo.png");
        assert!(render(&toast, false).contains(r#"src="ms-appx:///Assets/logo.png""#));
    }

    #[test]
    fn test_empty_lines_are_empty_elements() {
        let toast = ToastTemplate::new(TemplateType::Text01);
        assert!(render(&toast, true).contains(r#"<text id="1"/>"#));
    }

    #[test]
    fn test_actions_switch_to_generic_template() {
        let mut toast = ToastTemplate::new(TemplateType::Text01);
        toast.set_first_line("Pick one").add_action("Yes").add_action("No");

        let xml = render(&toast, true);
        assert!(xml.starts_with(r#"<toast template="ToastGeneric" duration="long">"#));
        assert!(xml.ends_with(
            r#"<actions><action content="Yes" arguments="0"/><action content="No" arguments="1"/></actions></toast>"#
        ));
    }

    #[test]
    fn test_explicit_duration_overrides_action_default() {
        let mut toast = ToastTemplate::new(TemplateType::Text01);
        toast.add_action("Ok").set_duration(Duration::Short);

        let xml = render(&toast, true);
        assert!(xml.starts_with(r#"<toast template="ToastGeneric" duration="short">"#));
    }

    #[test]
    fn test_audio_element() {
        let mut toast = ToastTemplate::new(TemplateType::Text01);
        assert!(!render(&toast, true).contains("<audio"));

        toast.set_audio_option(AudioOption::Silent);
        assert!(render(&toast, true).contains(r#"<audio silent="true"/>"#));

        toast
            .set_audio_path("ms-winsoundevent:Notification.Looping.Alarm")
            .set_audio_option(AudioOption::Loop);
        assert!(render(&toast, true).contains(
            r#"<audio src="ms-winsoundevent:Notification.Looping.Alarm" loop="true"/>"#
        ));
    }

    #[test]
    fn test_attribution_and_scenario() {
        let mut toast = ToastTemplate::new(TemplateType::Text02);
        toast
            .set_first_line("a")
            .set_attribution_text("via SMS")
            .set_scenario(Scenario::IncomingCall);

        let xml = render(&toast, true);
        assert!(xml.starts_with(r#"<toast scenario="incomingCall">"#));
        assert!(xml.contains(r#"<text id="2"/><text placement="attribution">via SMS</text></binding>"#));
    }

    #[test]
    fn test_legacy_os_skips_modern_nodes() {
        let mut toast = ToastTemplate::new(TemplateType::Text01);
        toast
            .set_first_line("plain")
            .set_attribution_text("ignored")
            .add_action("ignored")
            .set_duration(Duration::Long)
            .set_scenario(Scenario::Alarm)
            .set_audio_option(AudioOption::Loop);

        assert_eq!(
            render(&toast, false),
            r#"<toast><visual><binding template="ToastText01"><text id="1">plain</text></binding></visual></toast>"#
        );
    }

    #[test]
    fn test_values_are_escaped() {
        let mut toast = ToastTemplate::new(TemplateType::Text01);
        toast.set_first_line("Tom & <Jerry>").add_action("\"quoted\"");

        let xml = render(&toast, true);
        assert!(xml.contains("Tom &amp; &lt;Jerry&gt;"));
        assert!(xml.contains(r#"content="&quot;quoted&quot;""#));
    }
}

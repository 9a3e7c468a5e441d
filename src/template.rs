use serde::{Deserialize, Serialize};

/// The legacy toast layouts understood by the platform.
///
/// Discriminants match the platform's `ToastTemplateType` ordinals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TemplateType {
    ImageAndText01 = 0,
    ImageAndText02 = 1,
    ImageAndText03 = 2,
    ImageAndText04 = 3,
    Text01 = 4,
    Text02 = 5,
    Text03 = 6,
    Text04 = 7,
}

impl TemplateType {
    const TEXT_FIELD_COUNT: [usize; 8] = [1, 2, 2, 3, 1, 2, 2, 3];

    /// Number of text lines the layout carries.
    pub fn text_field_count(&self) -> usize {
        Self::TEXT_FIELD_COUNT[*self as usize]
    }

    pub fn has_image(&self) -> bool {
        (*self as u8) < (TemplateType::Text01 as u8)
    }

    /// Name used in the `template` attribute of the `<binding>` element.
    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateType::ImageAndText01 => "ToastImageAndText01",
            TemplateType::ImageAndText02 => "ToastImageAndText02",
            TemplateType::ImageAndText03 => "ToastImageAndText03",
            TemplateType::ImageAndText04 => "ToastImageAndText04",
            TemplateType::Text01 => "ToastText01",
            TemplateType::Text02 => "ToastText02",
            TemplateType::Text03 => "ToastText03",
            TemplateType::Text04 => "ToastText04",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        let value = value.trim_start_matches("Toast");
        match value.to_ascii_lowercase().as_str() {
            "imageandtext01" => Some(TemplateType::ImageAndText01),
            "imageandtext02" => Some(TemplateType::ImageAndText02),
            "imageandtext03" => Some(TemplateType::ImageAndText03),
            "imageandtext04" => Some(TemplateType::ImageAndText04),
            "text01" => Some(TemplateType::Text01),
            "text02" => Some(TemplateType::Text02),
            "text03" => Some(TemplateType::Text03),
            "text04" => Some(TemplateType::Text04),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextField {
    FirstLine = 0,
    SecondLine = 1,
    ThirdLine = 2,
}

impl TextField {
    pub fn index(&self) -> usize {
        *self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Duration {
    /// Let the system pick how long the toast stays on screen.
    #[default]
    System,
    Short,
    Long,
}

impl Duration {
    pub fn as_attr(&self) -> Option<&'static str> {
        match self {
            Duration::System => None,
            Duration::Short => Some("short"),
            Duration::Long => Some("long"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioOption {
    #[default]
    Default,
    Silent,
    Loop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Scenario {
    #[default]
    Default,
    Alarm,
    IncomingCall,
    Reminder,
}

impl Scenario {
    /// Value of the `scenario` attribute, `None` for the default behavior.
    pub fn as_attr(&self) -> Option<&'static str> {
        match self {
            Scenario::Default => None,
            Scenario::Alarm => Some("alarm"),
            Scenario::IncomingCall => Some("incomingCall"),
            Scenario::Reminder => Some("reminder"),
        }
    }
}

/// Built-in notification sounds.
///
/// <https://learn.microsoft.com/en-us/uwp/schemas/tiles/toastschema/element-audio>
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AudioSystemFile {
    #[default]
    DefaultSound,
    IM,
    Mail,
    Reminder,
    SMS,
    Alarm,
    Alarm2,
    Alarm3,
    Alarm4,
    Alarm5,
    Alarm6,
    Alarm7,
    Alarm8,
    Alarm9,
    Alarm10,
    Call,
    Call1,
    Call2,
    Call3,
    Call4,
    Call5,
    Call6,
    Call7,
    Call8,
    Call9,
    Call10,
}

impl AudioSystemFile {
    pub fn uri(&self) -> &'static str {
        match self {
            Self::DefaultSound => "ms-winsoundevent:Notification.Default",
            Self::IM => "ms-winsoundevent:Notification.IM",
            Self::Mail => "ms-winsoundevent:Notification.Mail",
            Self::Reminder => "ms-winsoundevent:Notification.Reminder",
            Self::SMS => "ms-winsoundevent:Notification.SMS",
            Self::Alarm => "ms-winsoundevent:Notification.Looping.Alarm",
            Self::Alarm2 => "ms-winsoundevent:Notification.Looping.Alarm2",
            Self::Alarm3 => "ms-winsoundevent:Notification.Looping.Alarm3",
            Self::Alarm4 => "ms-winsoundevent:Notification.Looping.Alarm4",
            Self::Alarm5 => "ms-winsoundevent:Notification.Looping.Alarm5",
            Self::Alarm6 => "ms-winsoundevent:Notification.Looping.Alarm6",
            Self::Alarm7 => "ms-winsoundevent:Notification.Looping.Alarm7",
            Self::Alarm8 => "ms-winsoundevent:Notification.Looping.Alarm8",
            Self::Alarm9 => "ms-winsoundevent:Notification.Looping.Alarm9",
            Self::Alarm10 => "ms-winsoundevent:Notification.Looping.Alarm10",
            Self::Call => "ms-winsoundevent:Notification.Looping.Call",
            Self::Call1 => "ms-winsoundevent:Notification.Looping.Call1",
            Self::Call2 => "ms-winsoundevent:Notification.Looping.Call2",
            Self::Call3 => "ms-winsoundevent:Notification.Looping.Call3",
            Self::Call4 => "ms-winsoundevent:Notification.Looping.Call4",
            Self::Call5 => "ms-winsoundevent:Notification.Looping.Call5",
            Self::Call6 => "ms-winsoundevent:Notification.Looping.Call6",
            Self::Call7 => "ms-winsoundevent:Notification.Looping.Call7",
            Self::Call8 => "ms-winsoundevent:Notification.Looping.Call8",
            Self::Call9 => "ms-winsoundevent:Notification.Looping.Call9",
            Self::Call10 => "ms-winsoundevent:Notification.Looping.Call10",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        let all = [
            Self::DefaultSound,
            Self::IM,
            Self::Mail,
            Self::Reminder,
            Self::SMS,
            Self::Alarm,
            Self::Alarm2,
            Self::Alarm3,
            Self::Alarm4,
            Self::Alarm5,
            Self::Alarm6,
            Self::Alarm7,
            Self::Alarm8,
            Self::Alarm9,
            Self::Alarm10,
            Self::Call,
            Self::Call1,
            Self::Call2,
            Self::Call3,
            Self::Call4,
            Self::Call5,
            Self::Call6,
            Self::Call7,
            Self::Call8,
            Self::Call9,
            Self::Call10,
        ];
        let wanted = value.to_ascii_lowercase();
        all.into_iter().find(|file| {
            let name = file
                .uri()
                .rsplit('.')
                .next()
                .unwrap_or_default()
                .to_ascii_lowercase();
            name == wanted
        })
    }
}

/// Everything a caller wants a toast to show.
///
/// The text slots are sized by the [`TemplateType`] at construction time.
#[derive(Debug, Clone)]
pub struct ToastTemplate {
    text_fields: Vec<String>,
    actions: Vec<String>,
    image_path: String,
    audio_path: String,
    attribution_text: String,
    scenario: Scenario,
    expiration: i64,
    audio_option: AudioOption,
    template_type: TemplateType,
    duration: Duration,
}

impl Default for ToastTemplate {
    fn default() -> Self {
        Self::new(TemplateType::ImageAndText02)
    }
}

impl ToastTemplate {
    pub fn new(template_type: TemplateType) -> Self {
        Self {
            text_fields: vec![String::new(); template_type.text_field_count()],
            actions: Vec::new(),
            image_path: String::new(),
            audio_path: String::new(),
            attribution_text: String::new(),
            scenario: Scenario::Default,
            expiration: 0,
            audio_option: AudioOption::Default,
            template_type,
            duration: Duration::System,
        }
    }

    pub fn set_first_line(&mut self, text: impl Into<String>) -> &mut Self {
        self.set_text_field(text, TextField::FirstLine)
    }

    pub fn set_second_line(&mut self, text: impl Into<String>) -> &mut Self {
        self.set_text_field(text, TextField::SecondLine)
    }

    pub fn set_third_line(&mut self, text: impl Into<String>) -> &mut Self {
        self.set_text_field(text, TextField::ThirdLine)
    }

    /// # Panics
    /// If `pos` is past the number of lines of the template type.
    pub fn set_text_field(&mut self, text: impl Into<String>, pos: TextField) -> &mut Self {
        let position = pos.index();
        assert!(
            position < self.text_fields.len(),
            "{:?} has only {} text field(s)",
            self.template_type,
            self.text_fields.len()
        );
        self.text_fields[position] = text.into();
        self
    }

    pub fn set_attribution_text(&mut self, text: impl Into<String>) -> &mut Self {
        self.attribution_text = text.into();
        self
    }

    pub fn set_image_path(&mut self, path: impl Into<String>) -> &mut Self {
        self.image_path = path.into();
        self
    }

    pub fn set_audio_path(&mut self, path: impl Into<String>) -> &mut Self {
        self.audio_path = path.into();
        self
    }

    pub fn set_audio_system_file(&mut self, audio: AudioSystemFile) -> &mut Self {
        self.audio_path = audio.uri().to_string();
        self
    }

    pub fn set_audio_option(&mut self, option: AudioOption) -> &mut Self {
        self.audio_option = option;
        self
    }

    pub fn set_duration(&mut self, duration: Duration) -> &mut Self {
        self.duration = duration;
        self
    }

    /// Milliseconds from the moment the toast is shown; `0` means no expiration.
    pub fn set_expiration(&mut self, milliseconds_from_now: i64) -> &mut Self {
        self.expiration = milliseconds_from_now;
        self
    }

    pub fn set_scenario(&mut self, scenario: Scenario) -> &mut Self {
        self.scenario = scenario;
        self
    }

    pub fn add_action(&mut self, label: impl Into<String>) -> &mut Self {
        self.actions.push(label.into());
        self
    }

    pub fn text_fields_count(&self) -> usize {
        self.text_fields.len()
    }

    pub fn actions_count(&self) -> usize {
        self.actions.len()
    }

    pub fn has_image(&self) -> bool {
        self.template_type.has_image()
    }

    pub fn text_fields(&self) -> &[String] {
        &self.text_fields
    }

    /// # Panics
    /// If `pos` is past the number of lines of the template type.
    pub fn text_field(&self, pos: TextField) -> &str {
        let position = pos.index();
        assert!(position < self.text_fields.len());
        &self.text_fields[position]
    }

    /// # Panics
    /// If `pos` is not a valid action index.
    pub fn action_label(&self, pos: usize) -> &str {
        assert!(pos < self.actions.len());
        &self.actions[pos]
    }

    pub fn actions(&self) -> &[String] {
        &self.actions
    }

    pub fn image_path(&self) -> &str {
        &self.image_path
    }

    pub fn audio_path(&self) -> &str {
        &self.audio_path
    }

    pub fn attribution_text(&self) -> &str {
        &self.attribution_text
    }

    pub fn scenario(&self) -> Scenario {
        self.scenario
    }

    pub fn expiration(&self) -> i64 {
        self.expiration
    }

    pub fn template_type(&self) -> TemplateType {
        self.template_type
    }

    pub fn audio_option(&self) -> AudioOption {
        self.audio_option
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }
}

use crate::audio::{Modality, Voice};
use crate::content::parts::TextPart;
use crate::safety::SafetySetting;
use crate::tools::Tool;

pub const DEFAULT_MODEL: &str = "models/gemini-2.0-flash-exp";
pub const DEFAULT_CANDIDATE_COUNT: u32 = 1;
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 2000;
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_TOP_P: f32 = 1.0;
pub const DEFAULT_TOP_K: u32 = 1;

/// Body of the `setup` message sent once the socket opens.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Setup {
    /// Fully qualified model name, ex: "models/gemini-2.0-flash-exp"
    model: String,

    generation_config: GenerationConfig,

    /// The system instruction prepended to every turn.
    system_instruction: SystemInstruction,

    /// Tools (functions and search retrieval) available to the model.
    tools: Vec<Tool>,

    safety_settings: Vec<SafetySetting>,
}

impl Default for Setup {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            generation_config: GenerationConfig::default(),
            system_instruction: SystemInstruction::new(""),
            tools: Vec::new(),
            safety_settings: Vec::new(),
        }
    }
}

impl Setup {
    pub fn builder() -> SetupConfigurator {
        SetupConfigurator::new()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn generation_config(&self) -> &GenerationConfig {
        &self.generation_config
    }

    pub fn system_instruction(&self) -> &str {
        self.system_instruction.parts.text()
    }

    pub fn tools(&self) -> &[Tool] {
        &self.tools
    }

    pub fn safety_settings(&self) -> &[SafetySetting] {
        &self.safety_settings
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    candidate_count: u32,
    max_output_tokens: u32,
    /// Sampling temperature for the model.
    temperature: f32,
    top_p: f32,
    top_k: u32,
    /// The modalities the model answers with, ex: ["TEXT"]
    response_modalities: Vec<Modality>,
    speech_config: SpeechConfig,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            candidate_count: DEFAULT_CANDIDATE_COUNT,
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            top_p: DEFAULT_TOP_P,
            top_k: DEFAULT_TOP_K,
            response_modalities: vec![Modality::default()],
            speech_config: SpeechConfig::new(Voice::default()),
        }
    }
}

impl GenerationConfig {
    pub fn candidate_count(&self) -> u32 {
        self.candidate_count
    }

    pub fn max_output_tokens(&self) -> u32 {
        self.max_output_tokens
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    pub fn top_p(&self) -> f32 {
        self.top_p
    }

    pub fn top_k(&self) -> u32 {
        self.top_k
    }

    pub fn response_modalities(&self) -> &[Modality] {
        &self.response_modalities
    }

    pub fn voice(&self) -> &Voice {
        &self.speech_config.voice_config.prebuilt_voice_config.voice_name
    }
}

// The service expects snake_case below `speechConfig`.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct SpeechConfig {
    voice_config: VoiceConfig,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct VoiceConfig {
    prebuilt_voice_config: PrebuiltVoiceConfig,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct PrebuiltVoiceConfig {
    voice_name: Voice,
}

impl SpeechConfig {
    fn new(voice: Voice) -> Self {
        Self {
            voice_config: VoiceConfig {
                prebuilt_voice_config: PrebuiltVoiceConfig { voice_name: voice },
            },
        }
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct SystemInstruction {
    parts: TextPart,
}

impl SystemInstruction {
    fn new(text: &str) -> Self {
        Self {
            parts: TextPart::new(text),
        }
    }
}

pub struct SetupConfigurator {
    setup: Setup,
}

impl Default for SetupConfigurator {
    fn default() -> Self {
        Self::new()
    }
}

impl SetupConfigurator {
    pub fn new() -> Self {
        Self {
            setup: Setup::default(),
        }
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.setup.model = model.to_string();
        self
    }

    pub fn with_max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.setup.generation_config.max_output_tokens = max_output_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.setup.generation_config.temperature = temperature;
        self
    }

    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.setup.generation_config.top_p = top_p;
        self
    }

    pub fn with_top_k(mut self, top_k: u32) -> Self {
        self.setup.generation_config.top_k = top_k;
        self
    }

    pub fn with_response_modality(mut self, modality: Modality) -> Self {
        self.setup.generation_config.response_modalities = vec![modality];
        self
    }

    pub fn with_voice(mut self, voice: Voice) -> Self {
        self.setup.generation_config.speech_config = SpeechConfig::new(voice);
        self
    }

    pub fn with_system_instruction(mut self, instruction: &str) -> Self {
        self.setup.system_instruction = SystemInstruction::new(instruction);
        self
    }

    pub fn with_tools(mut self, tools: Vec<Tool>) -> Self {
        self.setup.tools = tools;
        self
    }

    pub fn with_safety_settings(mut self, safety_settings: Vec<SafetySetting>) -> Self {
        self.setup.safety_settings = safety_settings;
        self
    }

    pub fn build(self) -> Setup {
        self.setup
    }
}

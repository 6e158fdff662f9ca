use gemini_live_types::audio::Base64EncodedAudioBytes;
use gemini_live_types::events::server::ServerContent;
use gemini_live_types::{AudioPayload, ExecutableCode, FunctionCall, Response, ResponseContent};
use gemini_live_utils::audio::{self, AudioError, DEFAULT_GAIN, OUTPUT_PCM16_BIT_DEPTH, OUTPUT_PCM16_SAMPLE_RATE};

/// Fragments of the turn currently being received.
#[derive(Debug, Default)]
pub(crate) struct Accumulator {
    text: Vec<String>,
    audio_mime_type: Option<String>,
    audio: Vec<Base64EncodedAudioBytes>,
    function_call: Option<FunctionCall>,
    executable_code: Option<ExecutableCode>,
}

impl Accumulator {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Appends the parts of a content frame in arrival order.
    pub(crate) fn absorb(&mut self, content: &ServerContent) {
        for part in content.parts() {
            if let Some(text) = part.text.as_ref().filter(|t| !t.is_empty()) {
                self.text.push(text.clone());
            } else if let Some(inline) = &part.inline_data {
                if self.audio_mime_type.is_none() {
                    self.audio_mime_type = inline.mime_type.clone();
                }
                self.audio.push(inline.data.clone());
            } else if let Some(code) = &part.executable_code {
                self.executable_code = Some(code.clone());
            }
        }
    }

    pub(crate) fn set_function_call(&mut self, call: FunctionCall) {
        self.function_call = Some(call);
    }

    #[cfg(test)]
    pub(crate) fn audio_mime_type(&self) -> Option<&str> {
        self.audio_mime_type.as_deref()
    }

    /// Clears every fragment so the next turn starts empty.
    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }

    /// Derives the completed response. Audio is only decoded and wrapped here.
    pub(crate) fn finalize(&self) -> Result<Response, AudioError> {
        if self.function_call.is_some() || self.executable_code.is_some() {
            return Ok(Response::new(ResponseContent::Function {
                function_call: self.function_call.clone(),
                executable_code: self.executable_code.clone(),
            }));
        }

        let text = if self.text.is_empty() {
            None
        } else {
            Some(self.text.concat().trim().to_string())
        };

        if self.audio.is_empty() {
            return Ok(Response::new(ResponseContent::Text { text }));
        }

        tracing::debug!(
            "encoding {} audio fragments, source mime type {:?}",
            self.audio.len(),
            self.audio_mime_type
        );
        let pcm = audio::decode_all(&self.audio);
        let wav = audio::pcm_to_wav(&pcm, OUTPUT_PCM16_SAMPLE_RATE, OUTPUT_PCM16_BIT_DEPTH, DEFAULT_GAIN)?;
        Ok(Response::new(ResponseContent::Audio {
            audio: AudioPayload::wav(audio::encode(&wav)),
            text,
        }))
    }
}

//! Text recognition backends.

use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::Mutex;

use image::{DynamicImage, ImageFormat};
use oar_ocr::core::traits::StandardPredictor;
use oar_ocr::predictor::{TextRecPredictor, TextRecPredictorBuilder};
use tracing::{debug, info};

use super::error::CaptchaError;

/// Reads the text printed on a captcha image.
pub trait TextRecognizer: Send + Sync {
    fn recognize(&self, image: &DynamicImage) -> Result<String, CaptchaError>;
}

/// Input shape of the PP-OCR recognition models, `[channels, height, width]`.
const REC_INPUT_SHAPE: [usize; 3] = [3, 48, 320];

/// CRNN text recognition through `oar-ocr`, reading a single captcha line.
///
/// The ONNX model and its character dictionary are loaded once; each call
/// runs one image through the predictor.
pub struct OarTextRecognizer {
    predictor: Mutex<TextRecPredictor>,
}

impl OarTextRecognizer {
    /// Load the recognition model at `model_path` with the dictionary at
    /// `char_dict_path` (one character per line).
    pub fn new(model_path: &Path, char_dict_path: &Path) -> Result<Self, CaptchaError> {
        let character_dict = load_character_dict(char_dict_path)?;
        info!(
            model = %model_path.display(),
            characters = character_dict.len(),
            "loading text recognition model"
        );

        let predictor = TextRecPredictorBuilder::new()
            .model_input_shape(REC_INPUT_SHAPE)
            .batch_size(1)
            .character_dict(character_dict)
            .build(model_path)
            .map_err(|e| {
                CaptchaError::Ocr(format!(
                    "failed to load recognition model {}: {}",
                    model_path.display(),
                    e
                ))
            })?;

        Ok(Self {
            predictor: Mutex::new(predictor),
        })
    }
}

impl std::fmt::Debug for OarTextRecognizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OarTextRecognizer").finish_non_exhaustive()
    }
}

impl TextRecognizer for OarTextRecognizer {
    fn recognize(&self, image: &DynamicImage) -> Result<String, CaptchaError> {
        let predictor = self
            .predictor
            .lock()
            .map_err(|_| CaptchaError::Ocr("recognition model lock poisoned".to_string()))?;

        let result = predictor
            .predict(vec![image.to_rgb8()], None)
            .map_err(|e| CaptchaError::Ocr(format!("recognition failed: {}", e)))?;

        let text = result
            .rec_text
            .first()
            .map(|text| text.to_string())
            .ok_or_else(|| CaptchaError::Ocr("recognizer returned no text".to_string()))?;
        debug!(
            text = %text,
            score = result.rec_score.first().copied().unwrap_or_default(),
            "recognized captcha"
        );
        Ok(text)
    }
}

/// Read a recognition dictionary: one entry per line, blank lines dropped.
pub fn load_character_dict(path: &Path) -> Result<Vec<String>, CaptchaError> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        CaptchaError::Ocr(format!(
            "failed to read character dictionary {}: {}",
            path.display(),
            e
        ))
    })?;

    let dict: Vec<String> = contents
        .lines()
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();

    if dict.is_empty() {
        return Err(CaptchaError::Ocr(format!(
            "character dictionary {} is empty",
            path.display()
        )));
    }
    Ok(dict)
}

/// Runs the `tesseract` command-line tool, feeding the image on stdin and
/// reading the text from stdout.
#[derive(Debug, Clone)]
pub struct TesseractCli {
    program: PathBuf,
    language: String,
}

impl TesseractCli {
    /// Use `tesseract` from `PATH` with English language data.
    pub fn new() -> Self {
        Self {
            program: PathBuf::from("tesseract"),
            language: "eng".to_string(),
        }
    }

    /// Use a specific tesseract executable.
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }
}

impl Default for TesseractCli {
    fn default() -> Self {
        Self::new()
    }
}

impl TextRecognizer for TesseractCli {
    fn recognize(&self, image: &DynamicImage) -> Result<String, CaptchaError> {
        let mut png = Vec::new();
        image.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;

        let mut child = Command::new(&self.program)
            .args(["stdin", "stdout", "-l", &self.language])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                CaptchaError::Ocr(format!("failed to run {}: {}", self.program.display(), e))
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(&png)
                .map_err(|e| CaptchaError::Ocr(format!("failed to send image: {}", e)))?;
        }

        let output = child
            .wait_with_output()
            .map_err(|e| CaptchaError::Ocr(format!("tesseract did not finish: {}", e)))?;

        if !output.status.success() {
            return Err(CaptchaError::Ocr(format!(
                "tesseract exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!(text = %text.trim(), "tesseract output");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn character_dict_skips_blank_lines() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "0\r\n1\n\n+\n-\n=\n").unwrap();

        let dict = load_character_dict(file.path()).unwrap();
        assert_eq!(dict, vec!["0", "1", "+", "-", "="]);
    }

    #[test]
    fn empty_character_dict_is_rejected() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let err = load_character_dict(file.path()).unwrap_err();
        assert!(matches!(err, CaptchaError::Ocr(msg) if msg.contains("is empty")));
    }

    #[test]
    fn missing_dictionary_fails_before_model_load() {
        let dir = tempfile::tempdir().unwrap();
        let err = OarTextRecognizer::new(
            &dir.path().join("rec.onnx"),
            &dir.path().join("dict.txt"),
        )
        .unwrap_err();
        assert!(
            matches!(err, CaptchaError::Ocr(msg) if msg.contains("character dictionary"))
        );
    }

    #[test]
    fn missing_model_is_ocr_error() {
        let dir = tempfile::tempdir().unwrap();
        let dict = dir.path().join("dict.txt");
        std::fs::write(&dict, "0\n1\n2\n").unwrap();

        let err = OarTextRecognizer::new(&dir.path().join("rec.onnx"), &dict).unwrap_err();
        assert!(matches!(err, CaptchaError::Ocr(msg) if msg.contains("recognition model")));
    }

    #[test]
    fn builder_overrides() {
        let cli = TesseractCli::new()
            .with_program("/opt/tesseract/bin/tesseract")
            .with_language("eng+hin");
        assert_eq!(cli.program, PathBuf::from("/opt/tesseract/bin/tesseract"));
        assert_eq!(cli.language, "eng+hin");
    }

    #[test]
    fn missing_program_is_ocr_error() {
        let cli = TesseractCli::new().with_program("/nonexistent/tesseract-binary");
        let image = DynamicImage::new_luma8(4, 4);
        let err = cli.recognize(&image).unwrap_err();
        assert!(matches!(err, CaptchaError::Ocr(_)));
    }
}

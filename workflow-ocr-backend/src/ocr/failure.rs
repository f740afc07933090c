use thiserror::Error;

/// Named failure kinds OCRmyPDF raises, each tied to its documented exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineFailureKind {
    BadArgs,
    InputFile,
    UnsupportedImageFormat,
    Dpi,
    DigitalSignature,
    TaggedPdf,
    ColorConversionNeeded,
    MissingDependency,
    OutputFileAccess,
    PriorOcrFound,
    SubprocessOutput,
    EncryptedPdf,
    TesseractConfig,
}

const ALL_KINDS: [EngineFailureKind; 13] = [
    EngineFailureKind::BadArgs,
    EngineFailureKind::InputFile,
    EngineFailureKind::UnsupportedImageFormat,
    EngineFailureKind::Dpi,
    EngineFailureKind::DigitalSignature,
    EngineFailureKind::TaggedPdf,
    EngineFailureKind::ColorConversionNeeded,
    EngineFailureKind::MissingDependency,
    EngineFailureKind::OutputFileAccess,
    EngineFailureKind::PriorOcrFound,
    EngineFailureKind::SubprocessOutput,
    EngineFailureKind::EncryptedPdf,
    EngineFailureKind::TesseractConfig,
];

/// Phrases OCRmyPDF (via Pillow) prints when the input is neither a PDF nor
/// a readable image.
const UNSUPPORTED_IMAGE_HINTS: [&str; 3] = [
    "cannot identify image file",
    "not a valid image",
    "unsupported image format",
];

impl EngineFailureKind {
    pub fn discriminator(&self) -> &'static str {
        match self {
            Self::BadArgs => "BadArgsError",
            Self::InputFile => "InputFileError",
            Self::UnsupportedImageFormat => "UnsupportedImageFormatError",
            Self::Dpi => "DpiError",
            Self::DigitalSignature => "DigitalSignatureError",
            Self::TaggedPdf => "TaggedPDFError",
            Self::ColorConversionNeeded => "ColorConversionNeededError",
            Self::MissingDependency => "MissingDependencyError",
            Self::OutputFileAccess => "OutputFileAccessError",
            Self::PriorOcrFound => "PriorOcrFoundError",
            Self::SubprocessOutput => "SubprocessOutputError",
            Self::EncryptedPdf => "EncryptedPdfError",
            Self::TesseractConfig => "TesseractConfigError",
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            Self::BadArgs => 1,
            Self::InputFile
            | Self::UnsupportedImageFormat
            | Self::Dpi
            | Self::DigitalSignature
            | Self::TaggedPdf
            | Self::ColorConversionNeeded => 2,
            Self::MissingDependency => 3,
            Self::OutputFileAccess => 5,
            Self::PriorOcrFound => 6,
            Self::SubprocessOutput => 7,
            Self::EncryptedPdf => 8,
            Self::TesseractConfig => 9,
        }
    }

    /// Default kind for an exit code. Codes OCRmyPDF returns without raising
    /// (4, 10) and codes outside its table have no kind.
    pub fn from_exit_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(Self::BadArgs),
            2 => Some(Self::InputFile),
            3 => Some(Self::MissingDependency),
            5 => Some(Self::OutputFileAccess),
            6 => Some(Self::PriorOcrFound),
            7 => Some(Self::SubprocessOutput),
            8 => Some(Self::EncryptedPdf),
            9 => Some(Self::TesseractConfig),
            _ => None,
        }
    }

    /// Classify a finished engine run from its exit code and stderr.
    ///
    /// A discriminator name printed by the engine wins when it agrees with the
    /// exit code; exit code 2 is refined from Pillow's "cannot identify" wording.
    pub fn classify(code: i32, stderr: &str) -> Option<Self> {
        let default = Self::from_exit_code(code)?;

        if let Some(named) = ALL_KINDS
            .iter()
            .copied()
            .find(|k| k.exit_code() == code && stderr.contains(k.discriminator()))
        {
            return Some(named);
        }

        if default == Self::InputFile {
            let lower = stderr.to_lowercase();
            if UNSUPPORTED_IMAGE_HINTS.iter().any(|h| lower.contains(h)) {
                return Some(Self::UnsupportedImageFormat);
            }
        }

        Some(default)
    }
}

/// A typed failure raised by the OCR engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct EngineFailure {
    pub kind: EngineFailureKind,
    pub exit_code: i32,
    pub message: String,
}

impl EngineFailure {
    pub fn new(kind: EngineFailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            exit_code: kind.exit_code(),
            message: message.into(),
        }
    }

    /// Build a failure from the engine's exit code and captured stderr, or
    /// `None` when the code does not belong to a typed failure.
    pub fn from_engine_output(code: i32, stderr: &str) -> Option<Self> {
        Self::classified(code, stderr, None)
    }

    /// Same as `from_engine_output`, but a message that mentions
    /// `scratch_dir` is withheld: it names server-side buffer paths.
    pub fn from_engine_run(code: i32, stderr: &str, scratch_dir: &str) -> Option<Self> {
        Self::classified(code, stderr, Some(scratch_dir))
    }

    fn classified(code: i32, stderr: &str, scratch_dir: Option<&str>) -> Option<Self> {
        let kind = EngineFailureKind::classify(code, stderr)?;
        Some(Self {
            kind,
            exit_code: code,
            message: failure_message(kind, stderr, scratch_dir),
        })
    }
}

/// The engine's own explanation: the last stderr line that is not empty,
/// without log-level decoration or a `<Discriminator>:` prefix.
fn failure_message(kind: EngineFailureKind, stderr: &str, scratch_dir: Option<&str>) -> String {
    let Some(line) = stderr.lines().map(str::trim).rfind(|l| !l.is_empty()) else {
        return String::new();
    };

    if scratch_dir.is_some_and(|dir| !dir.is_empty() && line.contains(dir)) {
        return String::new();
    }

    let line = ["ERROR - ", "ERROR: ", "ERROR "]
        .iter()
        .find_map(|p| line.strip_prefix(p))
        .unwrap_or(line);

    if line == kind.discriminator() {
        return String::new();
    }

    line.strip_prefix(kind.discriminator())
        .and_then(|rest| rest.strip_prefix(':'))
        .map(str::trim_start)
        .unwrap_or(line)
        .to_string()
}

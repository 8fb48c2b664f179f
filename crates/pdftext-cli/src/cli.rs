use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Extract reading-order text from PDF documents.
#[derive(Debug, Parser)]
#[command(name = "pdftext", about, version)]
pub struct Cli {
    /// Log extraction details (missing fonts, forced breaks) to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Extract text from PDF pages
    Text {
        /// Path to the PDF file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Page range (e.g. '1,3-5'). Default: all pages
        #[arg(long)]
        pages: Option<String>,

        /// Output format
        #[arg(long, value_enum, default_value_t = TextFormat::Text)]
        format: TextFormat,

        /// Maximum Form XObject nesting depth
        #[arg(long, default_value_t = 10)]
        max_depth: usize,

        /// Stop after this many text objects and XObject invocations per page
        #[arg(long)]
        max_spans: Option<usize>,
    },

    /// Dump the spans and tokens of each page's content stream
    Tokens {
        /// Path to the PDF file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Page range (e.g. '1,3-5'). Default: all pages
        #[arg(long)]
        pages: Option<String>,
    },
}

/// Output format for the text subcommand.
#[derive(Debug, Clone, ValueEnum)]
pub enum TextFormat {
    /// Plain text with a header per page
    Text,
    /// One JSON object per page
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn parse_text_subcommand_with_file() {
        let cli = Cli::parse_from(["pdftext", "text", "test.pdf"]);
        assert!(!cli.verbose);
        match cli.command {
            Commands::Text {
                ref file,
                ref pages,
                ref format,
                max_depth,
                max_spans,
            } => {
                assert_eq!(file, &PathBuf::from("test.pdf"));
                assert!(pages.is_none());
                assert!(matches!(format, TextFormat::Text));
                assert_eq!(max_depth, 10);
                assert_eq!(max_spans, None);
            }
            _ => panic!("expected Text subcommand"),
        }
    }

    #[test]
    fn parse_text_with_pages_and_format() {
        let cli = Cli::parse_from([
            "pdftext",
            "text",
            "test.pdf",
            "--pages",
            "1,3-5",
            "--format",
            "json",
            "--max-depth",
            "3",
        ]);
        match cli.command {
            Commands::Text {
                ref pages,
                ref format,
                max_depth,
                ..
            } => {
                assert_eq!(pages.as_deref(), Some("1,3-5"));
                assert!(matches!(format, TextFormat::Json));
                assert_eq!(max_depth, 3);
            }
            _ => panic!("expected Text subcommand"),
        }
    }

    #[test]
    fn verbose_is_global() {
        let cli = Cli::parse_from(["pdftext", "tokens", "a.pdf", "--verbose"]);
        assert!(cli.verbose);
        let cli = Cli::parse_from(["pdftext", "-v", "text", "a.pdf"]);
        assert!(cli.verbose);
    }

    #[test]
    fn parse_tokens_subcommand() {
        let cli = Cli::parse_from(["pdftext", "tokens", "input.pdf", "--pages", "2"]);
        match cli.command {
            Commands::Tokens { ref file, ref pages } => {
                assert_eq!(file, &PathBuf::from("input.pdf"));
                assert_eq!(pages.as_deref(), Some("2"));
            }
            _ => panic!("expected Tokens subcommand"),
        }
    }

    #[test]
    fn unknown_format_is_rejected() {
        let result = Cli::try_parse_from(["pdftext", "text", "a.pdf", "--format", "html"]);
        assert!(result.is_err());
    }

    #[test]
    fn missing_file_argument_is_rejected() {
        assert!(Cli::try_parse_from(["pdftext", "text"]).is_err());
    }
}

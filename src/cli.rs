use crate::commands::rotate::parse_angle;
use crate::page_range::SelectionMode;
use crate::pdf::Rotation;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pdfsuite")]
#[command(about = "PDF page extraction, removal, splitting and more, with MCP server support")]
#[command(version)]
pub struct Cli {
    /// More log output on stderr (-v debug, -vv trace). PDFSUITE_LOG overrides.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run as MCP server over stdio
    Mcp,

    /// Display PDF metadata and page sizes
    Info {
        /// PDF file to inspect
        path: PathBuf,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Check a page specification without writing anything
    Validate {
        /// Page specification (e.g., "1-3,5,7-9")
        pages: String,

        /// Take the page count from this PDF
        #[arg(short, long, required_unless_present = "page_count")]
        file: Option<PathBuf>,

        /// Page count to validate against
        #[arg(short = 'n', long, conflicts_with = "file")]
        page_count: Option<u32>,

        /// How the selection will be used
        #[arg(short, long, value_enum, default_value = "extract")]
        mode: SelectionMode,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Copy pages into a new PDF, in the order given
    #[command(alias = "cat")]
    Extract {
        /// PDF file to extract from
        path: PathBuf,

        /// Pages and ranges (e.g., "1-3,5,7-9"); repeats are kept
        pages: String,

        /// Output file [default: extracted-pages-<name>]
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Delete pages from a PDF
    Remove {
        /// PDF file to remove pages from
        path: PathBuf,

        /// Pages and ranges to delete (e.g., "1,3,5")
        pages: String,

        /// Output file [default: removed-pages-<name>]
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Split a PDF into one file per range, or one per page
    #[command(alias = "burst")]
    Split {
        /// PDF file to split
        path: PathBuf,

        /// Ranges, one output file each (e.g., "1-3,4-6"); omit to burst every page
        ranges: Option<String>,

        /// Output directory [default: the input's directory]
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Set page rotation
    Rotate {
        /// PDF file to rotate
        path: PathBuf,

        /// Absolute angle in degrees: 0, 90, 180 or 270
        #[arg(value_parser = parse_angle, allow_hyphen_values = true)]
        angle: Rotation,

        /// Only rotate these pages (e.g., "2,4-6") [default: all]
        #[arg(short, long)]
        pages: Option<String>,

        /// Output file [default: rotated-<angle>-<name>]
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Stamp centred text on pages
    Watermark {
        /// PDF file to watermark
        path: PathBuf,

        /// Text to draw
        text: String,

        /// Only watermark these pages [default: all]
        #[arg(short, long)]
        pages: Option<String>,

        /// Font size in points
        #[arg(long, default_value_t = 60.0)]
        font_size: f32,

        /// Gray level, 0 (black) to 1 (white)
        #[arg(long, default_value_t = 0.7)]
        gray: f32,

        /// Opacity, 0 to 1
        #[arg(long, default_value_t = 0.3)]
        opacity: f32,

        /// Output file [default: watermarked-<name>]
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Combine multiple PDFs into one
    Merge {
        /// PDF files to merge, at least two
        #[arg(required = true, num_args = 2..)]
        inputs: Vec<PathBuf>,

        /// Output file
        #[arg(short, long, default_value = "merged-document.pdf")]
        output: PathBuf,
    },

    /// Turn JPG and PNG images into a PDF, one page per image
    #[command(alias = "img2pdf")]
    Images {
        /// Image files, in page order
        #[arg(required = true, num_args = 1..)]
        inputs: Vec<PathBuf>,

        /// Output file
        #[arg(short, long, default_value = "images-to-pdf.pdf")]
        output: PathBuf,
    },

    /// Rewrite a PDF with unused objects dropped, objects packed into
    /// object streams and streams compressed
    Compress {
        /// PDF file to compress
        path: PathBuf,

        /// Output file [default: compressed-<name>]
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_rotate_with_pages() {
        let cli = Cli::try_parse_from(["pdfsuite", "rotate", "in.pdf", "270", "-p", "1-2"]).unwrap();
        match cli.command {
            Commands::Rotate { angle, pages, .. } => {
                assert_eq!(angle, Rotation::Left);
                assert_eq!(pages.as_deref(), Some("1-2"));
            }
            _ => panic!("expected rotate"),
        }
    }

    #[test]
    fn test_validate_needs_a_source() {
        assert!(Cli::try_parse_from(["pdfsuite", "validate", "1-3"]).is_err());
        let cli = Cli::try_parse_from(["pdfsuite", "-v", "validate", "1-3", "-n", "5", "-m", "remove"])
            .unwrap();
        assert_eq!(cli.verbose, 1);
        assert!(matches!(
            cli.command,
            Commands::Validate {
                page_count: Some(5),
                mode: SelectionMode::Remove,
                ..
            }
        ));
    }

    #[test]
    fn test_merge_needs_two_inputs() {
        assert!(Cli::try_parse_from(["pdfsuite", "merge", "a.pdf"]).is_err());
        assert!(Cli::try_parse_from(["pdfsuite", "merge", "a.pdf", "b.pdf"]).is_ok());
    }

    #[test]
    fn test_images_default_output() {
        assert!(Cli::try_parse_from(["pdfsuite", "images"]).is_err());
        let cli = Cli::try_parse_from(["pdfsuite", "img2pdf", "a.jpg", "b.png"]).unwrap();
        match cli.command {
            Commands::Images { inputs, output } => {
                assert_eq!(inputs.len(), 2);
                assert_eq!(output, PathBuf::from("images-to-pdf.pdf"));
            }
            _ => panic!("expected images"),
        }
    }
}

//! docfill CLI - Word template filling tool

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use uuid::Uuid;

use docfill::record::DOCUMENT_TYPE_FIELD;
use docfill::store::{self, display_name, resolve_template};
use docfill::{
    DocumentKind, JsonFormat, OutputDir, OutputMetadata, RenderOptions, RenderStats,
    StructuredRecord, Template, TemplateStore, TemplateSummary,
};

type CliResult = Result<(), Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "docfill")]
#[command(version)]
#[command(about = "Fill Word templates with structured records", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render one record into a template
    Render {
        /// Template file path or identifier in the template directory
        #[arg(short, long, value_name = "TEMPLATE")]
        template: String,

        /// Record file (YAML or JSON)
        #[arg(short, long, value_name = "FILE")]
        data: PathBuf,

        /// Output file (defaults to the record name with .docx)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Template directory
        #[arg(long, value_name = "DIR", env = "DOCFILL_TEMPLATE_DIR")]
        template_dir: Option<PathBuf>,

        #[command(flatten)]
        render: RenderArgs,
    },

    /// Generate a document of a given type and file it in the output directory
    Generate {
        /// Document type, e.g. "служебная записка", "письмо", "memo"
        #[arg(long = "type", value_name = "TYPE")]
        doc_type: String,

        /// Record file (YAML or JSON)
        #[arg(short, long, value_name = "FILE")]
        data: PathBuf,

        /// Sender name, used when the record has none
        #[arg(long)]
        sender_name: Option<String>,

        /// Sender position, used when the record has none
        #[arg(long)]
        sender_position: Option<String>,

        /// Recipient name, used when the record has none
        #[arg(long)]
        recipient_name: Option<String>,

        /// Recipient position, used when the record has none
        #[arg(long)]
        recipient_position: Option<String>,

        /// Subject for the download name (defaults to the record's subject)
        #[arg(long)]
        subject: Option<String>,

        /// Template directory
        #[arg(
            long,
            value_name = "DIR",
            env = "DOCFILL_TEMPLATE_DIR",
            default_value = "templates"
        )]
        template_dir: PathBuf,

        /// Output directory
        #[arg(
            long,
            value_name = "DIR",
            env = "DOCFILL_OUTPUT_DIR",
            default_value = "documents"
        )]
        output_dir: PathBuf,

        #[command(flatten)]
        render: RenderArgs,
    },

    /// Render many records into one template in parallel
    Batch {
        /// Template file path or identifier in the template directory
        #[arg(short, long, value_name = "TEMPLATE")]
        template: String,

        /// Record files (YAML or JSON)
        #[arg(short, long, value_name = "FILE", num_args = 1.., required = true)]
        data: Vec<PathBuf>,

        /// Output directory
        #[arg(short, long, value_name = "DIR", env = "DOCFILL_OUTPUT_DIR")]
        output_dir: PathBuf,

        /// Template directory
        #[arg(long, value_name = "DIR", env = "DOCFILL_TEMPLATE_DIR")]
        template_dir: Option<PathBuf>,

        #[command(flatten)]
        render: RenderArgs,
    },

    /// Show the placeholders of a template
    Inspect {
        /// Template file path or identifier in the template directory
        #[arg(value_name = "TEMPLATE")]
        template: String,

        /// Print the summary as JSON instead
        #[arg(long)]
        json: bool,

        /// Include the full document tree in the JSON summary
        #[arg(long, requires = "json")]
        tree: bool,

        /// Output compact JSON
        #[arg(long, requires = "json")]
        compact: bool,

        /// Template directory
        #[arg(long, value_name = "DIR", env = "DOCFILL_TEMPLATE_DIR")]
        template_dir: Option<PathBuf>,
    },

    /// List generated documents, newest first
    List {
        /// Output directory
        #[arg(
            long,
            value_name = "DIR",
            env = "DOCFILL_OUTPUT_DIR",
            default_value = "documents"
        )]
        output_dir: PathBuf,
    },

    /// List available templates
    Templates {
        /// Template directory
        #[arg(
            long,
            value_name = "DIR",
            env = "DOCFILL_TEMPLATE_DIR",
            default_value = "templates"
        )]
        template_dir: PathBuf,
    },

    /// Show version information
    Version,
}

/// Rendering flags shared by the rendering commands.
#[derive(Args)]
struct RenderArgs {
    /// Record field expanded into body paragraphs
    #[arg(long, default_value = "body")]
    body_key: String,

    /// First line indent of body paragraphs, in centimetres
    #[arg(long, value_name = "CM", default_value_t = docfill::render::DEFAULT_BODY_INDENT_CM)]
    body_indent: f32,

    /// Leave headers and footers untouched
    #[arg(long)]
    no_headers: bool,

    /// Also remove unresolved placeholders from headers and footers
    #[arg(long, conflicts_with = "no_headers")]
    clean_headers: bool,
}

impl RenderArgs {
    fn options(&self) -> RenderOptions {
        RenderOptions::new()
            .with_body_key(self.body_key.as_str())
            .with_body_indent_cm(self.body_indent)
            .with_headers_footers(!self.no_headers)
            .with_header_footer_cleanup(self.clean_headers)
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Render {
            template,
            data,
            output,
            template_dir,
            render,
        } => cmd_render(
            &template,
            &data,
            output.as_deref(),
            template_dir.as_deref(),
            &render.options(),
        ),
        Commands::Generate {
            doc_type,
            data,
            sender_name,
            sender_position,
            recipient_name,
            recipient_position,
            subject,
            template_dir,
            output_dir,
            render,
        } => cmd_generate(GenerateRequest {
            doc_type,
            data,
            sender: [sender_name, sender_position],
            recipient: [recipient_name, recipient_position],
            subject,
            template_dir,
            output_dir,
            options: render.options(),
        }),
        Commands::Batch {
            template,
            data,
            output_dir,
            template_dir,
            render,
        } => cmd_batch(
            &template,
            &data,
            &output_dir,
            template_dir.as_deref(),
            &render.options(),
        ),
        Commands::Inspect {
            template,
            json,
            tree,
            compact,
            template_dir,
        } => cmd_inspect(&template, json, tree, compact, template_dir.as_deref()),
        Commands::List { output_dir } => cmd_list(&output_dir),
        Commands::Templates { template_dir } => cmd_templates(&template_dir),
        Commands::Version => {
            cmd_version();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn load_template(template: &str, template_dir: Option<&Path>) -> Result<Template, docfill::Error> {
    let store = template_dir.map(TemplateStore::open).transpose()?;
    resolve_template(template, store.as_ref())
}

/// Read a record file, returning the raw text alongside the parsed record.
fn load_record(path: &Path) -> Result<(String, StructuredRecord), docfill::Error> {
    let source = fs::read_to_string(path)?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let record = if is_json {
        StructuredRecord::from_json_str(&source)?
    } else {
        StructuredRecord::from_yaml_str(&source)?
    };
    Ok((source, record))
}

fn print_stats(stats: &RenderStats) {
    println!(
        "  {} {} placeholder(s) in {} paragraph(s)",
        "├─".dimmed(),
        stats.tags_replaced,
        stats.paragraphs_substituted
    );
    if stats.paragraphs_emphasized > 0 {
        println!(
            "  {} {} label paragraph(s) bolded",
            "├─".dimmed(),
            stats.paragraphs_emphasized
        );
    }
    if stats.body_placed {
        println!(
            "  {} body: {} paragraph(s)",
            "├─".dimmed(),
            stats.body_paragraphs
        );
    } else {
        println!("  {} body: {}", "├─".dimmed(), "not placed".yellow());
    }
    println!(
        "  {} {} leftover placeholder(s) removed",
        "└─".dimmed(),
        stats.leftovers_removed
    );
}

fn cmd_render(
    template: &str,
    data: &Path,
    output: Option<&Path>,
    template_dir: Option<&Path>,
    options: &RenderOptions,
) -> CliResult {
    let template = load_template(template, template_dir)?;
    let (_, record) = load_record(data)?;

    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| data.with_extension("docx"));

    let result = template.render_to_file(&record, options, &output)?;

    println!("{} {}", "Saved to".green(), output.display());
    print_stats(&result.stats);

    Ok(())
}

struct GenerateRequest {
    doc_type: String,
    data: PathBuf,
    sender: [Option<String>; 2],
    recipient: [Option<String>; 2],
    subject: Option<String>,
    template_dir: PathBuf,
    output_dir: PathBuf,
    options: RenderOptions,
}

fn cmd_generate(req: GenerateRequest) -> CliResult {
    let kind = DocumentKind::from_request(&req.doc_type)?;
    let (source, mut record) = load_record(&req.data)?;

    for (group, values) in [("sender", &req.sender), ("recipient", &req.recipient)] {
        for (key, value) in ["name", "position"].into_iter().zip(values) {
            if let Some(value) = value {
                record.fill_missing(group, key, value.as_str());
            }
        }
    }

    record.insert(DOCUMENT_TYPE_FIELD, store::document_type_value(&req.doc_type));
    let document_type = record.normalize_document_type().unwrap_or_default();

    let store = TemplateStore::open(&req.template_dir)?;
    let template = store.load_kind(kind)?;
    let result = template.render(&record, &req.options)?;

    let outputs = OutputDir::open(&req.output_dir)?;
    let stem = Uuid::new_v4().to_string();
    if let Err(e) = outputs.save_source(&stem, &source) {
        log::error!("failed to keep record source: {}", e);
    }

    let created_at = chrono::Local::now().naive_local();
    let field = |path: &str| record.get_path(path).map(|v| v.to_string());
    let sender = field("sender.name");
    let recipient = field("recipient.name");
    let subject = req.subject.clone().or_else(|| field("subject"));
    let name = display_name(
        created_at,
        &req.doc_type,
        sender.as_deref(),
        recipient.as_deref(),
        subject.as_deref(),
    );

    let metadata = OutputMetadata::new(format!("{}.docx", stem), name, document_type, created_at);
    let path = outputs.save(&stem, &result.content, &metadata)?;

    println!("{} {}", "Generated".green().bold(), kind);
    println!("  {} {}", "├─".dimmed(), path.display());
    println!("  {} {}", "└─".dimmed(), metadata.display_name);
    println!("{}", serde_json::to_string_pretty(&metadata)?);

    Ok(())
}

fn cmd_batch(
    template: &str,
    data: &[PathBuf],
    output_dir: &Path,
    template_dir: Option<&Path>,
    options: &RenderOptions,
) -> CliResult {
    let template = load_template(template, template_dir)?;
    fs::create_dir_all(output_dir)?;

    let pb = ProgressBar::new(data.len() as u64 * 2);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    pb.set_message("Reading records...");
    let mut records = Vec::with_capacity(data.len());
    for path in data {
        let (_, record) = load_record(path)?;
        records.push(record);
        pb.inc(1);
    }

    pb.set_message("Rendering...");
    let results = template.render_batch(&records, options);

    let mut failed = 0;
    let mut total = RenderStats::new();
    for (path, result) in data.iter().zip(results) {
        let stem = path.file_stem().unwrap_or_default().to_string_lossy();
        let target = output_dir.join(format!("{}.docx", stem));
        match result {
            Ok(rendered) => {
                fs::write(&target, &rendered.content)?;
                total.merge(&rendered.stats);
            }
            Err(e) => {
                pb.println(format!("{} {}: {}", "Failed".red(), path.display(), e));
                failed += 1;
            }
        }
        pb.inc(1);
    }

    pb.finish_with_message("Done!");

    println!(
        "\n{} {} of {} document(s) written to {}",
        "Done!".green().bold(),
        data.len() - failed,
        data.len(),
        output_dir.display()
    );
    print_stats(&total);

    if failed > 0 {
        return Err(format!("{} record(s) failed", failed).into());
    }
    Ok(())
}

fn cmd_inspect(
    template: &str,
    json: bool,
    tree: bool,
    compact: bool,
    template_dir: Option<&Path>,
) -> CliResult {
    let template = load_template(template, template_dir)?;

    if json {
        let format = if compact {
            JsonFormat::Compact
        } else {
            JsonFormat::Pretty
        };
        let doc = template.document();
        let mut summary = TemplateSummary::new(doc, &RenderOptions::default().body_key);
        if tree {
            summary = summary.with_tree(doc);
        }
        println!("{}", summary.to_json(format)?);
        return Ok(());
    }

    let doc = template.document();
    println!("{}", "Template Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "Paragraphs".bold(), doc.paragraphs().count());
    println!("{}: {}", "Tables".bold(), doc.tables().count());
    println!("{}: {}", "Headers".bold(), doc.headers.len());
    println!("{}: {}", "Footers".bold(), doc.footers.len());

    println!();
    println!("{}", "Placeholders".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    let keys = template.placeholders();
    if keys.is_empty() {
        println!("{}", "(none)".dimmed());
    }
    for key in keys {
        println!("  {{{{ {} }}}}", key);
    }

    Ok(())
}

fn cmd_list(output_dir: &Path) -> CliResult {
    let outputs = OutputDir::open(output_dir)?;
    let items = outputs.list()?;

    if items.is_empty() {
        println!("{}", "No documents yet".dimmed());
        return Ok(());
    }

    for meta in items {
        println!(
            "{}  {}  {}",
            meta.created_at.format("%Y-%m-%d %H:%M:%S").to_string().dimmed(),
            meta.document_type.cyan(),
            meta.display_name
        );
        println!("    {}", meta.doc_filename.dimmed());
    }

    Ok(())
}

fn cmd_templates(template_dir: &Path) -> CliResult {
    let store = TemplateStore::open(template_dir)?;
    let names = store.list()?;

    println!(
        "{} {}",
        "Templates in".cyan().bold(),
        store.root().display()
    );
    for name in &names {
        println!("  {}", name);
    }

    println!();
    println!("{}", "Document types".cyan().bold());
    for kind in DocumentKind::ALL {
        let id = kind.template_id();
        let status = if names.iter().any(|n| n == id) {
            "ok".green()
        } else {
            "missing".red()
        };
        println!("  {:<20} {} [{}]", kind.title(), id, status);
    }

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "docfill".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Word template filling tool");
    println!();
    println!("License: MIT");
}

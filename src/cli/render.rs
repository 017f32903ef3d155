//! `plume render`: markdown files to HTML fragments.
//!
//! - **Build** - validate `[markdown]` into a [`Renderer`] before touching any file
//! - **Collect** - CLI paths, or every `.md` under `[build].content`
//! - **Render** - parallel, one shared renderer
//! - **Write** - mirror the source layout under `[build].output`

use crate::{
    config::PlumeConfig,
    debug,
    dom::RenderConfig,
    log,
    logger::ProgressLine,
    pipeline::Renderer,
    utils::plural_count,
};
use anyhow::{Context, Result, bail};
use jwalk::WalkDir;
use rayon::prelude::*;
use std::{
    fs,
    path::{Path, PathBuf},
};

use super::RenderArgs;

/// One markdown source and where its output goes, relative to the output dir.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Job {
    source: PathBuf,
    relative: PathBuf,
}

/// Output format for rendered documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Html,
    Json,
}

impl Format {
    const fn extension(self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Json => "json",
        }
    }
}

/// Render every selected document. Returns the number written.
pub fn render_docs(args: &RenderArgs, config: &PlumeConfig) -> Result<usize> {
    let renderer = Renderer::from_config(&config.markdown)?;
    let jobs = collect_jobs(&args.paths, &config.build.content)?;

    if jobs.is_empty() {
        log!("render"; "no markdown files found");
        return Ok(0);
    }

    let format = if args.json { Format::Json } else { Format::Html };
    let html = RenderConfig::new(config.build.minify);
    let output = config.build.output.as_path();

    let progress = ProgressLine::new(&[("markdown", jobs.len())]);
    let failures: Vec<(PathBuf, anyhow::Error)> = jobs
        .par_iter()
        .filter_map(|job| {
            let result = render_job(&renderer, job, output, format, &html);
            progress.inc("markdown");
            result.err().map(|e| (job.source.clone(), e))
        })
        .collect();
    progress.finish();

    if !failures.is_empty() {
        for (path, err) in &failures {
            log!("error"; "{}: {:#}", config.root_relative(path).display(), err);
        }
        bail!(
            "{} of {} failed",
            plural_count(failures.len(), "document"),
            jobs.len()
        );
    }

    log!("render"; "{} written to {}", plural_count(jobs.len(), "document"), output.display());
    Ok(jobs.len())
}

fn render_job(
    renderer: &Renderer,
    job: &Job,
    output: &Path,
    format: Format,
    html: &RenderConfig,
) -> Result<()> {
    let source = fs::read_to_string(&job.source)
        .with_context(|| format!("failed to read {}", job.source.display()))?;

    let rendered = match format {
        Format::Html => renderer.render_html(&source, html),
        Format::Json => serde_json::to_string_pretty(&renderer.render(&source))
            .context("failed to serialize document")?,
    };

    let dest = output.join(&job.relative).with_extension(format.extension());
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(&dest, rendered).with_context(|| format!("failed to write {}", dest.display()))?;

    debug!("render"; "{} -> {}", job.source.display(), dest.display());
    Ok(())
}

/// Resolve CLI paths (or the content dir) into render jobs, sorted by source.
fn collect_jobs(paths: &[PathBuf], content_dir: &Path) -> Result<Vec<Job>> {
    let roots: Vec<&Path> = if paths.is_empty() {
        vec![content_dir]
    } else {
        paths.iter().map(PathBuf::as_path).collect()
    };

    let mut jobs = Vec::new();
    for root in roots {
        if root.is_dir() {
            jobs.extend(collect_markdown(root).into_iter().map(|source| Job {
                relative: relative_to(&source, root),
                source,
            }));
        } else if root.is_file() {
            let relative = match root.strip_prefix(content_dir) {
                Ok(rel) => rel.to_path_buf(),
                Err(_) => root.file_name().map(PathBuf::from).unwrap_or_default(),
            };
            jobs.push(Job {
                source: root.to_path_buf(),
                relative,
            });
        } else {
            bail!("path not found: {}", root.display());
        }
    }

    jobs.sort_by(|a, b| a.source.cmp(&b.source));
    jobs.dedup_by(|a, b| a.source == b.source);
    Ok(jobs)
}

/// Every `.md` file under `dir`, skipping hidden entries.
fn collect_markdown(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .skip_hidden(true)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "md"))
        .collect()
}

fn relative_to(path: &Path, root: &Path) -> PathBuf {
    path.strip_prefix(root)
        .map(Path::to_path_buf)
        .unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    struct Site {
        _dir: tempfile::TempDir,
        config: PlumeConfig,
    }

    fn site(files: &[(&str, &str)]) -> Site {
        let dir = tempfile::tempdir().unwrap();
        let content = dir.path().join("content");
        for (name, body) in files {
            let path = content.join(name);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, body).unwrap();
        }

        let mut config = test_parse_config("[markdown.code]\nhighlight = false");
        config.root = dir.path().to_path_buf();
        config.build.content = content;
        config.build.output = dir.path().join("public");
        Site { _dir: dir, config }
    }

    fn args() -> RenderArgs {
        RenderArgs {
            paths: Vec::new(),
            content: None,
            output: None,
            minify: None,
            json: false,
            verbose: false,
        }
    }

    #[test]
    fn test_collect_skips_other_files() {
        let site = site(&[
            ("index.md", "# Home"),
            ("posts/first.md", "# First"),
            ("notes.txt", "ignored"),
            (".drafts/secret.md", "# Hidden"),
        ]);
        let jobs = collect_jobs(&[], &site.config.build.content).unwrap();
        let relative: Vec<_> = jobs.iter().map(|j| j.relative.clone()).collect();
        assert_eq!(
            relative,
            vec![PathBuf::from("index.md"), PathBuf::from("posts/first.md")]
        );
    }

    #[test]
    fn test_collect_missing_path_errors() {
        let site = site(&[]);
        let missing = site.config.root.join("nope.md");
        assert!(collect_jobs(&[missing], &site.config.build.content).is_err());
    }

    #[test]
    fn test_render_mirrors_layout() {
        let site = site(&[("index.md", "## Intro {#intro}"), ("posts/first.md", "# First")]);
        let count = render_docs(&args(), &site.config).unwrap();
        assert_eq!(count, 2);

        let output = &site.config.build.output;
        let index = fs::read_to_string(output.join("index.html")).unwrap();
        assert!(index.contains(r##"<h2 id="intro">Intro<a href="#intro" class="anchor">#</a></h2>"##));
        assert!(output.join("posts/first.html").is_file());
    }

    #[test]
    fn test_render_single_file_json() {
        let site = site(&[("posts/first.md", "# First")]);
        let args = RenderArgs {
            paths: vec![site.config.build.content.join("posts/first.md")],
            json: true,
            ..args()
        };
        render_docs(&args, &site.config).unwrap();

        let json = fs::read_to_string(site.config.build.output.join("posts/first.json")).unwrap();
        let tree: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(tree["root"]["tag"], "article");
    }

    #[test]
    fn test_invalid_config_writes_nothing() {
        let mut site = site(&[("index.md", "# Home")]);
        site.config.markdown.code.copy.timeout = 0;
        assert!(render_docs(&args(), &site.config).is_err());
        assert!(!site.config.build.output.exists());
    }
}

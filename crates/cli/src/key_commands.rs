use std::{
    io::{Read, Write},
    path::Path,
};

use {
    anyhow::{Context, Result, bail},
    base64::{Engine, engine::general_purpose::STANDARD},
    clap::Subcommand,
    strongbox_config::{ENV_KEYS_VAR, EnvKeySource, FileKeySource, KeyFileWatcher, find_key_file},
    strongbox_metrics::{MetricsRecorderConfig, init_metrics},
    strongbox_vault::{KeyLoader, KeyRing, SymmetricKey},
    tracing::{info, warn},
};

#[derive(Subcommand)]
pub enum KeysAction {
    /// List identifiers with their members, newest first.
    List,
}

/// Build a loader over the selected key source.
///
/// Order: `--keys-file`, then `STRONGBOX_KEYS`, then key file discovery.
fn loader(keys_file: Option<&Path>) -> Result<KeyLoader> {
    if let Some(path) = keys_file {
        return Ok(KeyLoader::new(FileKeySource::new(path)));
    }
    if std::env::var_os(ENV_KEYS_VAR).is_some() {
        return Ok(KeyLoader::new(EnvKeySource::default()));
    }
    let source = FileKeySource::discover()
        .with_context(|| format!("pass --keys-file or set {ENV_KEYS_VAR}"))?;
    Ok(KeyLoader::new(source))
}

fn extra_refs(extra: &[String]) -> Vec<&[u8]> {
    extra.iter().map(String::as_bytes).collect()
}

pub fn encrypt(keys_file: Option<&Path>, identifier: &str, extra: &[String]) -> Result<()> {
    let key = loader(keys_file)?.load_key(identifier)?;

    let mut plaintext = Vec::new();
    std::io::stdin().read_to_end(&mut plaintext)?;

    let envelope = key.encrypt(&plaintext, &extra_refs(extra))?;
    println!("{}", STANDARD.encode(envelope));
    Ok(())
}

pub fn decrypt(keys_file: Option<&Path>, identifier: &str, extra: &[String]) -> Result<()> {
    let key = loader(keys_file)?.load_key(identifier)?;

    let mut encoded = String::new();
    std::io::stdin().read_to_string(&mut encoded)?;
    let envelope = STANDARD
        .decode(encoded.trim())
        .context("input is not base64")?;

    let plaintext = key.decrypt(&envelope, &extra_refs(extra))?;
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&plaintext)?;
    stdout.flush()?;
    Ok(())
}

pub fn handle_keys(keys_file: Option<&Path>, action: KeysAction) -> Result<()> {
    match action {
        KeysAction::List => {
            let set = loader(keys_file)?.load_all()?;
            if set.is_empty() {
                println!("No keys found.");
            }
            for (identifier, key) in set.iter() {
                let kind = if key.is_composite() {
                    "composite"
                } else {
                    "single"
                };
                println!("{identifier} ({kind})");
                for member in key.members() {
                    println!("  {} @ {}", member.suite(), member.timestamp());
                }
            }
            Ok(())
        },
    }
}

pub async fn watch(keys_file: Option<&Path>) -> Result<()> {
    let Some(path) = keys_file.map(Path::to_path_buf).or_else(find_key_file) else {
        bail!("watch needs a key file: pass --keys-file");
    };

    let metrics = init_metrics(MetricsRecorderConfig {
        enabled: true,
        ..Default::default()
    })?;

    let loader = KeyLoader::new(FileKeySource::new(&path));
    let ring = KeyRing::load(&loader)?;
    let (_watcher, mut events) = KeyFileWatcher::start(&path)?;
    info!(
        path = %path.display(),
        identifiers = ring.snapshot().len(),
        "watching key file"
    );

    loop {
        tokio::select! {
            event = events.recv() => {
                if event.is_none() {
                    break;
                }
                // A failed reload keeps serving the previous key set.
                match ring.reload(&loader) {
                    Ok(count) => info!(identifiers = count, "key file reloaded"),
                    Err(e) => warn!(error = %e, "key file reload failed"),
                }
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    let rendered = metrics.render();
    if !rendered.is_empty() {
        eprintln!("{rendered}");
    }
    Ok(())
}

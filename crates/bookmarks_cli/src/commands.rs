//! Command execution against a loaded bookmark store.
//!
//! # Responsibility
//! - Map each CLI command onto one store operation.
//! - Render the list/detail views as plain text.
//!
//! # Invariants
//! - Mutating commands refuse to run over a slot that failed to load, so a
//!   corrupt slot is never overwritten by accident.

use crate::config::{AddArgs, Command, EditArgs, IconArgs};
use crate::form::{BookmarkForm, FormError};
use crate::icon::display_icon;
use base64::prelude::BASE64_STANDARD;
use base64::Engine;
use bookmarks_core::{
    BackendError, Bookmark, BookmarkId, BookmarkStore, LoggingError, StorageBackend, StoreError,
};
use log::warn;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum CliError {
    Form(FormError),
    Store(StoreError),
    /// The slot failed to load; mutations are blocked.
    Unloaded(StoreError),
    NotFound(BookmarkId),
    IconFile { path: PathBuf, source: std::io::Error },
    /// The icon file's type is not `image/*`.
    NotAnImage { path: PathBuf, mime: String },
    /// The storage backend could not be opened.
    Backend(BackendError),
    Logging(LoggingError),
    Output(std::io::Error),
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Form(err) => write!(f, "{err}"),
            Self::Store(err @ StoreError::WriteFailed(_)) => {
                write!(f, "{err}; the change was not saved and will be lost")
            }
            Self::Store(err) => write!(f, "{err}"),
            Self::Unloaded(err) => write!(
                f,
                "{err}; refusing to modify bookmarks until the stored data is repaired"
            ),
            Self::NotFound(id) => write!(f, "bookmark not found: {id}"),
            Self::IconFile { path, source } => {
                write!(f, "failed to read icon file `{}`: {source}", path.display())
            }
            Self::NotAnImage { path, mime } => write!(
                f,
                "icon file `{}` is `{mime}`, expected an image",
                path.display()
            ),
            Self::Backend(err) => write!(f, "{err}"),
            Self::Logging(err) => write!(f, "{err}"),
            Self::Output(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CliError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Form(err) => Some(err),
            Self::Store(err) | Self::Unloaded(err) => Some(err),
            Self::NotFound(_) | Self::NotAnImage { .. } => None,
            Self::IconFile { source, .. } => Some(source),
            Self::Backend(err) => Some(err),
            Self::Logging(err) => Some(err),
            Self::Output(err) => Some(err),
        }
    }
}

impl From<FormError> for CliError {
    fn from(value: FormError) -> Self {
        Self::Form(value)
    }
}

impl From<StoreError> for CliError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<BackendError> for CliError {
    fn from(value: BackendError) -> Self {
        Self::Backend(value)
    }
}

impl From<LoggingError> for CliError {
    fn from(value: LoggingError) -> Self {
        Self::Logging(value)
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Output(value)
    }
}

/// Loads `backend` and runs `command`, writing user-facing output to `out`.
pub fn execute<B: StorageBackend>(
    backend: B,
    command: Command,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let (mut store, loaded) = BookmarkStore::open(backend);

    match command {
        Command::List => {
            if let Err(err) = loaded {
                writeln!(out, "warning: {err}")?;
            }
            list(&store, out)
        }
        Command::Show { id } => {
            if let Err(err) = loaded {
                writeln!(out, "warning: {err}")?;
            }
            let id = BookmarkId::from(id);
            let bookmark = store.get(&id).ok_or(CliError::NotFound(id))?;
            show(bookmark, out)
        }
        Command::Add(args) => {
            loaded.map_err(CliError::Unloaded)?;
            let id = add(&mut store, args)?;
            writeln!(out, "added {id}")?;
            Ok(())
        }
        Command::Edit(args) => {
            loaded.map_err(CliError::Unloaded)?;
            let id = edit(&mut store, args)?;
            writeln!(out, "updated {id}")?;
            Ok(())
        }
        Command::Delete { id } => {
            loaded.map_err(CliError::Unloaded)?;
            let id = BookmarkId::from(id);
            if !store.delete(&id)? {
                return Err(CliError::NotFound(id));
            }
            writeln!(out, "deleted {id}")?;
            Ok(())
        }
    }
}

fn list<B: StorageBackend>(
    store: &BookmarkStore<B>,
    out: &mut impl Write,
) -> Result<(), CliError> {
    if store.is_empty() {
        writeln!(out, "No bookmarks yet. Use `bookmarks add` to create one.")?;
        return Ok(());
    }
    for bookmark in store.bookmarks() {
        write!(out, "{}  {}  {}", bookmark.id, bookmark.name, bookmark.url1)?;
        if let Some(url2) = &bookmark.url2 {
            write!(out, " | {url2}")?;
        }
        writeln!(out)?;
    }
    Ok(())
}

fn show(bookmark: &Bookmark, out: &mut impl Write) -> Result<(), CliError> {
    writeln!(out, "id:    {}", bookmark.id)?;
    writeln!(out, "name:  {}", bookmark.name)?;
    writeln!(out, "url1:  {}", bookmark.url1)?;
    writeln!(out, "url2:  {}", bookmark.url2.as_deref().unwrap_or("-"))?;
    writeln!(out, "icon:  {}", display_icon(bookmark))?;
    Ok(())
}

fn add<B: StorageBackend>(
    store: &mut BookmarkStore<B>,
    args: AddArgs,
) -> Result<BookmarkId, CliError> {
    let mut form = BookmarkForm {
        name: args.name,
        url1: args.url1,
        url2: args.url2.unwrap_or_default(),
        ..BookmarkForm::default()
    };
    apply_icon(&mut form, &args.icon)?;

    let draft = form.validate()?;
    Ok(store.add(draft)?)
}

fn edit<B: StorageBackend>(
    store: &mut BookmarkStore<B>,
    args: EditArgs,
) -> Result<BookmarkId, CliError> {
    let id = BookmarkId::from(args.id);
    let existing = store.get(&id).ok_or_else(|| CliError::NotFound(id.clone()))?;

    let mut form = BookmarkForm::from_bookmark(existing);
    if let Some(name) = args.name {
        form.name = name;
    }
    if let Some(url1) = args.url1 {
        form.url1 = url1;
    }
    if let Some(url2) = args.url2 {
        form.url2 = url2;
    }
    if args.clear_url2 {
        form.url2.clear();
    }
    if args.clear_icon {
        form.clear_icon();
    }
    apply_icon(&mut form, &args.icon)?;

    let draft = form.validate()?;
    if !store.update(Bookmark::from_draft(id.clone(), draft))? {
        warn!("event=cli_edit module=cli status=warn reason=vanished id={id}");
    }
    Ok(id)
}

fn apply_icon(form: &mut BookmarkForm, icon: &IconArgs) -> Result<(), CliError> {
    if let Some(url) = &icon.icon_url {
        form.set_icon_url(url.as_str());
    }
    if let Some(path) = &icon.icon_file {
        form.set_icon_data(icon_data_url(path)?);
    }
    Ok(())
}

/// Reads an image file into a `data:<mime>;base64,...` URL.
///
/// The type is guessed from the extension; non-image types are rejected.
pub fn icon_data_url(path: &Path) -> Result<String, CliError> {
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    if mime.type_() != mime_guess::mime::IMAGE {
        return Err(CliError::NotAnImage {
            path: path.to_path_buf(),
            mime: mime.essence_str().to_string(),
        });
    }

    let bytes = std::fs::read(path).map_err(|source| CliError::IconFile {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(format!(
        "data:{};base64,{}",
        mime.essence_str(),
        BASE64_STANDARD.encode(bytes)
    ))
}

#[cfg(test)]
mod tests {
    use super::{execute, icon_data_url, CliError};
    use crate::config::{AddArgs, Command, EditArgs, IconArgs};
    use crate::form::FormError;
    use bookmarks_core::{BookmarkStore, Icon, MemoryBackend, StorageBackend, STORAGE_KEY};

    fn run(backend: &MemoryBackend, command: Command) -> (Result<(), CliError>, String) {
        let mut out = Vec::new();
        let result = execute(backend, command, &mut out);
        (result, String::from_utf8(out).unwrap())
    }

    fn add_args(name: &str, url1: &str) -> AddArgs {
        AddArgs {
            name: name.to_string(),
            url1: url1.to_string(),
            url2: None,
            icon: IconArgs::default(),
        }
    }

    fn edit_args(id: &str) -> EditArgs {
        EditArgs {
            id: id.to_string(),
            name: None,
            url1: None,
            url2: None,
            clear_url2: false,
            icon: IconArgs::default(),
            clear_icon: false,
        }
    }

    fn only_id(backend: &MemoryBackend) -> String {
        let (store, _) = BookmarkStore::open(backend);
        store.bookmarks()[0].id.to_string()
    }

    #[test]
    fn list_on_empty_store_prints_hint() {
        let backend = MemoryBackend::new();
        let (result, output) = run(&backend, Command::List);
        result.unwrap();
        assert!(output.starts_with("No bookmarks yet"));
    }

    #[test]
    fn add_then_list_and_show() {
        let backend = MemoryBackend::new();
        let mut args = add_args("Example", "https://example.com");
        args.url2 = Some("https://backup.example.com".to_string());
        run(&backend, Command::Add(args)).0.unwrap();
        let id = only_id(&backend);

        let (result, output) = run(&backend, Command::List);
        result.unwrap();
        assert_eq!(
            output,
            format!("{id}  Example  https://example.com | https://backup.example.com\n")
        );

        let (result, output) = run(&backend, Command::Show { id: id.clone() });
        result.unwrap();
        assert!(output.contains("name:  Example"));
        assert!(output.contains("https://www.google.com/s2/favicons?sz=32&domain=example.com"));
    }

    #[test]
    fn add_rejects_invalid_form_without_writing() {
        let backend = MemoryBackend::new();
        let (result, _) = run(&backend, Command::Add(add_args("Example", "example.com")));

        assert!(matches!(
            result,
            Err(CliError::Form(FormError::InvalidUrl { .. }))
        ));
        assert_eq!(backend.read(STORAGE_KEY).unwrap(), None);
    }

    #[test]
    fn edit_changes_only_given_fields() {
        let backend = MemoryBackend::new();
        let mut args = add_args("Example", "https://example.com");
        args.icon.icon_url = Some("https://example.com/icon.png".to_string());
        run(&backend, Command::Add(args)).0.unwrap();
        let id = only_id(&backend);

        let mut edit = edit_args(&id);
        edit.name = Some("Example2".to_string());
        run(&backend, Command::Edit(edit)).0.unwrap();

        let (store, _) = BookmarkStore::open(&backend);
        let bookmark = &store.bookmarks()[0];
        assert_eq!(bookmark.id.as_str(), id);
        assert_eq!(bookmark.name, "Example2");
        assert_eq!(bookmark.url1, "https://example.com");
        assert_eq!(
            bookmark.icon,
            Icon::Remote("https://example.com/icon.png".to_string())
        );

        let mut clear = edit_args(&id);
        clear.clear_icon = true;
        run(&backend, Command::Edit(clear)).0.unwrap();
        let (store, _) = BookmarkStore::open(&backend);
        assert_eq!(store.bookmarks()[0].icon, Icon::None);
    }

    #[test]
    fn delete_unknown_id_reports_not_found() {
        let backend = MemoryBackend::new();
        let (result, _) = run(
            &backend,
            Command::Delete {
                id: "missing".to_string(),
            },
        );
        assert!(matches!(result, Err(CliError::NotFound(_))));
    }

    #[test]
    fn corrupt_slot_allows_reads_but_blocks_writes() {
        let backend = MemoryBackend::new();
        backend.insert_raw(STORAGE_KEY, "not json");

        let (result, output) = run(&backend, Command::List);
        result.unwrap();
        assert!(output.starts_with("warning: stored bookmarks are corrupted"));

        let (result, _) = run(&backend, Command::Add(add_args("x", "https://x.example")));
        assert!(matches!(result, Err(CliError::Unloaded(_))));
        assert_eq!(
            backend.read(STORAGE_KEY).unwrap(),
            Some(b"not json".to_vec())
        );
    }

    #[test]
    fn empty_slot_file_accepts_new_bookmarks() {
        let backend = MemoryBackend::new();
        backend.insert_raw(STORAGE_KEY, "");

        let (result, output) = run(&backend, Command::List);
        result.unwrap();
        assert!(!output.contains("warning"));

        let (result, _) = run(&backend, Command::Add(add_args("x", "https://x.example")));
        result.unwrap();
        assert!(backend.read(STORAGE_KEY).unwrap().unwrap().starts_with(b"["));
    }

    #[test]
    fn write_failure_is_reported() {
        let backend = MemoryBackend::with_capacity(16);
        let (result, _) = run(&backend, Command::Add(add_args("Example", "https://example.com")));

        let err = result.unwrap_err();
        assert!(err.to_string().contains("will be lost"));
    }

    #[test]
    fn icon_file_becomes_data_url() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("icon.PNG");
        std::fs::write(&path, [0x89, b'P', b'N', b'G']).unwrap();

        let data = icon_data_url(&path).unwrap();
        assert_eq!(data, "data:image/png;base64,iVBORw==");

        let missing = icon_data_url(&dir.path().join("missing.png")).unwrap_err();
        assert!(matches!(missing, CliError::IconFile { .. }));
    }

    #[test]
    fn icon_file_type_comes_from_extension() {
        let dir = tempfile::tempdir().unwrap();
        for (name, mime) in [
            ("icon.bmp", "image/bmp"),
            ("icon.tiff", "image/tiff"),
            ("icon.svg", "image/svg+xml"),
            ("icon.webp", "image/webp"),
        ] {
            let path = dir.path().join(name);
            std::fs::write(&path, b"x").unwrap();
            let data = icon_data_url(&path).unwrap();
            assert!(
                data.starts_with(&format!("data:{mime};base64,")),
                "{name} -> {data}"
            );
        }
    }

    #[test]
    fn non_image_icon_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, b"hello").unwrap();

        let err = icon_data_url(&path).unwrap_err();
        assert!(matches!(
            err,
            CliError::NotAnImage { ref mime, .. } if mime == "text/plain"
        ));
        let unknown = icon_data_url(&dir.path().join("blob")).unwrap_err();
        assert!(matches!(unknown, CliError::NotAnImage { .. }));
    }
}

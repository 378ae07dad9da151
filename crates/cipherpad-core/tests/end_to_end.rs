use std::fs;
use std::sync::Mutex;
use std::thread::JoinHandle;
use std::time::Duration;

use cipherpad_core::codec;
use cipherpad_core::crypto::FileKeyStore;
use cipherpad_core::notebook::{open_body, seal_body};
use cipherpad_core::settings::{PASSWORD_HASH_KEY, PASSWORD_SALT_KEY};
use cipherpad_core::storage::{NewNote, Note, Reseal};
use cipherpad_core::{
    CipherpadError, FileSettingsStore, NoteBody, NoteRecordStore, Notebook, PasswordGate,
    Result, SecretString, Session, SettingsStore, SqliteNoteStore, UnreadableReason,
};
use tempfile::TempDir;

struct Install {
    dir: TempDir,
}

impl Install {
    fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("temp dir should be available"),
        }
    }

    fn gate(&self) -> PasswordGate<FileSettingsStore> {
        PasswordGate::new(FileSettingsStore::new(self.dir.path().join("settings.json")))
    }

    fn keys(&self) -> FileKeyStore {
        FileKeyStore::new(self.dir.path().join("notes.key"))
    }

    fn store(&self) -> SqliteNoteStore {
        SqliteNoteStore::open(&self.dir.path().join("notes.db")).expect("open should succeed")
    }

    fn setup(&self, password: &str) -> Session {
        Session::initialize(&self.gate(), &self.keys(), &secret(password))
            .expect("setup should succeed")
    }

    fn unlock(&self, password: &str) -> Session {
        Session::unlock(&self.gate(), &self.keys(), &secret(password))
            .expect("unlock should succeed")
    }
}

fn secret(value: &str) -> SecretString {
    SecretString::from(value.to_string())
}

#[test]
fn test_password_then_note_survives_restart() {
    let install = Install::new();

    let session = install.setup("p@ss");
    assert!(install.gate().verify_password(&secret("p@ss")).unwrap());
    let cipher = session.cipher();
    let encoded = seal_body(&cipher, "Buy milk").expect("seal should succeed");
    let id = install
        .store()
        .insert(&NewNote::new("", encoded.encrypted_message, encoded.iv))
        .expect("insert should succeed")
        .id;
    session.lock();

    // Fresh handles, as after an app restart.
    let session = install.unlock("p@ss");
    let record = install.store().get(id).unwrap().expect("note should exist");
    let body = open_body(&session.cipher(), &record.encrypted_message, &record.iv)
        .expect("open should succeed");
    assert_eq!(body, "Buy milk");
}

#[test]
fn test_wrong_password_never_yields_a_session() {
    let install = Install::new();
    install.gate().set_password(&secret("secret123")).unwrap();

    assert!(!install.gate().verify_password(&secret("wrong")).unwrap());
    let result = Session::unlock(&install.gate(), &install.keys(), &secret("wrong"));
    assert!(matches!(result, Err(CipherpadError::IncorrectPassword)));
    assert!(!install.dir.path().join("notes.key").exists());
}

#[test]
fn test_settings_file_holds_only_salt_and_digest() {
    let install = Install::new();
    install.gate().set_password(&secret("secret123")).unwrap();

    let raw = fs::read_to_string(install.dir.path().join("settings.json")).unwrap();
    assert!(!raw.contains("secret123"));

    let settings = FileSettingsStore::new(install.dir.path().join("settings.json"));
    let hash = settings.get(PASSWORD_HASH_KEY).unwrap().unwrap();
    let salt = settings.get(PASSWORD_SALT_KEY).unwrap().unwrap();
    assert_eq!(codec::decode(&hash).unwrap().len(), 64);
    assert_eq!(codec::decode(&salt).unwrap().len(), 16);
}

#[test]
fn test_same_password_twice_changes_salt_and_hash() {
    let install = Install::new();
    let settings_path = install.dir.path().join("settings.json");

    install.gate().set_password(&secret("secret123")).unwrap();
    let first = fs::read_to_string(&settings_path).unwrap();
    install.gate().set_password(&secret("secret123")).unwrap();
    let second = fs::read_to_string(&settings_path).unwrap();

    let settings = FileSettingsStore::new(&settings_path);
    assert_ne!(first, second);
    assert!(install.gate().verify_password(&secret("secret123")).unwrap());
    assert!(settings.get(PASSWORD_SALT_KEY).unwrap().is_some());
}

#[test]
fn test_corrupted_ciphertext_byte_reports_unreadable() {
    let install = Install::new();
    let notebook = Notebook::new(install.store(), install.setup("p@ss"));

    let note = notebook.add("groceries", "Buy milk").unwrap();
    let other = notebook.add("todo", "Call mom").unwrap();

    let mut ciphertext = codec::decode(&note.encrypted_message).unwrap();
    ciphertext[0] ^= 0x01;
    let mut tampered = note.clone();
    tampered.encrypted_message = codec::encode(&ciphertext);
    notebook
        .store()
        .replace_ciphertexts(&[tampered])
        .expect("replace should succeed");

    let opened = notebook.read(note.id).expect("read should not fail the caller");
    assert_eq!(
        opened.body,
        NoteBody::Unreadable(UnreadableReason::AuthenticationFailed)
    );
    assert_eq!(
        notebook.read(other.id).unwrap().body.as_text(),
        Some("Call mom")
    );
}

#[test]
fn test_corrupted_persisted_text_is_an_error_not_garbage() {
    let install = Install::new();
    let cipher = install.setup("p@ss").cipher();

    let encoded = seal_body(&cipher, "Buy milk").unwrap();
    let mut chars: Vec<char> = encoded.encrypted_message.chars().collect();
    chars[2] = if chars[2] == 'A' { 'B' } else { 'A' };
    let corrupted: String = chars.into_iter().collect();

    let err = open_body(&cipher, &corrupted, &encoded.iv).unwrap_err();
    assert!(err.is_unreadable_note());
}

#[test]
fn test_notebook_lifecycle_on_disk() {
    let install = Install::new();
    install.setup("first-password").lock();

    let id = {
        let notebook = Notebook::new(install.store(), install.unlock("first-password"));
        let note = notebook.add("Plan", "zażółć gęślą jaźń 🚀").unwrap();
        notebook.edit(note.id, Some("Plan v2"), None).unwrap();
        notebook.lock();
        note.id
    };

    install
        .gate()
        .change_password(&secret("first-password"), &secret("second-password"))
        .unwrap();

    let notebook = Notebook::new(install.store(), install.unlock("second-password"));
    let opened = notebook.read(id).unwrap();
    assert_eq!(opened.note.title, "Plan v2");
    assert_eq!(opened.body.as_text(), Some("zażółć gęślą jaźń 🚀"));

    notebook.delete(id).unwrap();
    assert!(notebook.list().unwrap().is_empty());
}

#[test]
fn test_lost_key_file_fails_unlock_instead_of_replacing_key() {
    let install = Install::new();
    let notebook = Notebook::new(install.store(), install.setup("p@ss"));
    notebook.add("groceries", "Buy milk").unwrap();
    notebook.lock();

    let key_path = install.dir.path().join("notes.key");
    fs::remove_file(&key_path).unwrap();

    let result = Session::unlock(&install.gate(), &install.keys(), &secret("p@ss"));
    assert!(matches!(result, Err(CipherpadError::NoteKeyMissing)));
    assert!(!key_path.exists());
}

/// Store wrapper that starts another writer while a reseal transaction is open.
struct RacingStore {
    inner: SqliteNoteStore,
    racer: Mutex<Option<Box<dyn FnOnce() -> (Result<Note>, Result<Note>) + Send>>>,
    handle: Mutex<Option<JoinHandle<(Result<Note>, Result<Note>)>>>,
}

impl NoteRecordStore for RacingStore {
    fn bind_key(&self, fingerprint: &str) {
        self.inner.bind_key(fingerprint)
    }

    fn insert(&self, note: &NewNote) -> Result<Note> {
        self.inner.insert(note)
    }

    fn update(&self, note: &Note) -> Result<Note> {
        self.inner.update(note)
    }

    fn get(&self, id: i64) -> Result<Option<Note>> {
        self.inner.get(id)
    }

    fn list(&self) -> Result<Vec<Note>> {
        self.inner.list()
    }

    fn delete(&self, id: i64) -> Result<bool> {
        self.inner.delete(id)
    }

    fn replace_ciphertexts(&self, notes: &[Note]) -> Result<()> {
        self.inner.replace_ciphertexts(notes)
    }

    fn reseal_all(
        &self,
        new_fingerprint: &str,
        reseal: &mut dyn FnMut(&Note) -> Result<Reseal>,
        before_commit: &mut dyn FnMut() -> Result<()>,
    ) -> Result<()> {
        let mut racer = self.racer.lock().unwrap().take();
        self.inner.reseal_all(
            new_fingerprint,
            &mut |note| {
                if let Some(race) = racer.take() {
                    *self.handle.lock().unwrap() = Some(std::thread::spawn(race));
                    std::thread::sleep(Duration::from_millis(200));
                }
                reseal(note)
            },
            before_commit,
        )
    }
}

#[test]
fn test_writes_racing_a_key_rotation_are_refused_not_lost() {
    let install = Install::new();
    let session = install.setup("p@ss");
    let note = Notebook::new(install.store(), session)
        .add("t", "original")
        .unwrap();

    let other = Notebook::new(install.store(), install.unlock("p@ss"));
    let id = note.id;
    let store = RacingStore {
        inner: install.store(),
        racer: Mutex::new(Some(Box::new(move || {
            let edited = other.edit(id, None, Some("edited by another writer"));
            let added = other.add("late", "added by another writer");
            (edited, added)
        }))),
        handle: Mutex::new(None),
    };
    let mut rotating = Notebook::new(store, install.unlock("p@ss"));

    let report = rotating.rotate_key(&install.keys()).unwrap();
    assert_eq!(report.reencrypted, 1);

    let handle = rotating.store().handle.lock().unwrap().take().unwrap();
    let (edited, added) = handle.join().unwrap();
    assert!(matches!(edited, Err(CipherpadError::KeyMismatch)));
    assert!(matches!(added, Err(CipherpadError::KeyMismatch)));

    // Every stored note opens under the stored key, and the retry lands.
    let fresh = Notebook::new(install.store(), install.unlock("p@ss"));
    let listed = fresh.list().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].body.as_text(), Some("original"));

    fresh.edit(id, None, Some("edited by another writer")).unwrap();
    assert_eq!(
        fresh.read(id).unwrap().body.as_text(),
        Some("edited by another writer")
    );
}

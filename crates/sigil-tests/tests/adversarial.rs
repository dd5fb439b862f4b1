//! Adversarial tests for the wallet store.
//!
//! Wrong credentials, tampered or half-written record files, and racing
//! creators must all fail loudly without returning a plausible secret or
//! damaging wallets that were already stored.

use std::fs;
use std::sync::Arc;
use std::thread;

use proptest::prelude::*;
use sigil_tests::helpers::*;
use sigil_wallet::{
    ExportFormat, ExportedSecret, ImportSecret, MemoryConfigStore, WalletError, WalletKind,
    WalletManager, WalletRecord, mnemonic,
};
use zeroize::Zeroizing;

fn record_path(mgr: &WalletManager, name: &str) -> std::path::PathBuf {
    mgr.store().record_path(name)
}

fn rewrite_record(mgr: &WalletManager, name: &str, edit: impl FnOnce(&mut WalletRecord)) {
    let mut record = mgr.store().load(name).unwrap();
    edit(&mut record);
    fs::write(record_path(mgr, name), serde_json::to_vec_pretty(&record).unwrap()).unwrap();
}

fn assert_corrupt(err: WalletError) {
    assert!(matches!(err, WalletError::CorruptedRecord { .. }), "expected corrupt record, got {err}");
}

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn wrong_password_never_decrypts(
        password in "[a-z0-9]{1,24}",
        guess in "[a-z0-9]{1,24}",
    ) {
        prop_assume!(password != guess);
        let (mgr, _dir) = test_manager();
        mgr.create("w", password.as_bytes(), WalletKind::PrivateKey).unwrap();

        let err = mgr.export("w", guess.as_bytes(), ExportFormat::PrivateKey).unwrap_err();
        prop_assert_eq!(err, WalletError::InvalidPassword);

        let err = mgr.delete("w", guess.as_bytes(), &MemoryConfigStore::new()).unwrap_err();
        prop_assert_eq!(err, WalletError::InvalidPassword);
        prop_assert!(mgr.store().exists("w"));
    }

    #[test]
    fn any_password_roundtrips(password in proptest::collection::vec(any::<u8>(), 0..48)) {
        let (mgr, _dir) = test_manager();
        let created = mgr.create("w", &password, WalletKind::Mnemonic).unwrap();
        let original = created.mnemonic.unwrap();
        let exported = mgr.export("w", &password, ExportFormat::Mnemonic).unwrap();
        prop_assert_eq!(exported.expose(), original.as_str());
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn generated_phrases_always_validate(_i in 0u8..64) {
        let phrase = mnemonic::generate();
        prop_assert!(mnemonic::validate(&phrase));
    }

    #[test]
    fn garbage_private_keys_rejected(input in "[g-z]{64}") {
        let (mgr, _dir) = test_manager();
        let err = mgr.import("k", b"pw", ImportSecret::from_text(&input)).unwrap_err();
        prop_assert!(matches!(err, WalletError::InvalidPrivateKey(_)));
        prop_assert!(mgr.list().unwrap().is_empty());
    }
}

#[test]
fn empty_password_is_still_a_password() {
    let (mgr, _dir) = test_manager();
    mgr.create("w", b"", WalletKind::PrivateKey).unwrap();
    assert_eq!(
        mgr.export("w", b" ", ExportFormat::PrivateKey).unwrap_err(),
        WalletError::InvalidPassword
    );
    assert!(mgr.export("w", b"", ExportFormat::PrivateKey).is_ok());
}

// ---------------------------------------------------------------------------
// Tampered and partial records
// ---------------------------------------------------------------------------

#[test]
fn truncated_record_is_corrupt_not_missing() {
    let (mgr, _dir) = test_manager();
    mgr.create("w", b"pw", WalletKind::Mnemonic).unwrap();
    let path = record_path(&mgr, "w");
    let data = fs::read(&path).unwrap();
    fs::write(&path, &data[..data.len() / 3]).unwrap();

    assert_corrupt(mgr.get_address("w").unwrap_err());
    assert_corrupt(mgr.export("w", b"pw", ExportFormat::PrivateKey).unwrap_err());
    assert!(mgr.list().unwrap().is_empty());
}

#[test]
fn empty_record_file_is_corrupt() {
    let (mgr, _dir) = test_manager();
    mgr.create("w", b"pw", WalletKind::PrivateKey).unwrap();
    fs::write(record_path(&mgr, "w"), b"").unwrap();
    assert_corrupt(mgr.get_address("w").unwrap_err());
}

#[test]
fn flipped_ciphertext_reports_invalid_password() {
    let (mgr, _dir) = test_manager();
    mgr.create("w", b"pw", WalletKind::PrivateKey).unwrap();
    rewrite_record(&mgr, "w", |r| {
        let mut bytes = hex::decode(&r.encrypted_data).unwrap();
        bytes[0] ^= 0x01;
        r.encrypted_data = hex::encode(bytes);
    });
    assert_eq!(
        mgr.export("w", b"pw", ExportFormat::PrivateKey).unwrap_err(),
        WalletError::InvalidPassword
    );
}

#[test]
fn substituted_address_is_detected() {
    let (mgr, _dir) = test_manager();
    mgr.create("victim", b"pw", WalletKind::PrivateKey).unwrap();
    let attacker = mgr.create("attacker", b"pw", WalletKind::PrivateKey).unwrap();

    rewrite_record(&mgr, "victim", |r| r.address = attacker.address.encode());

    // Metadata reads trust the record; anything that decrypts must not.
    assert_eq!(mgr.get_address("victim").unwrap(), attacker.address);
    assert_corrupt(mgr.export("victim", b"pw", ExportFormat::PrivateKey).unwrap_err());
}

#[test]
fn kind_swap_is_detected() {
    let (mgr, _dir) = test_manager();
    mgr.create("w", b"pw", WalletKind::PrivateKey).unwrap();
    rewrite_record(&mgr, "w", |r| r.kind = WalletKind::Mnemonic);
    assert_corrupt(mgr.export("w", b"pw", ExportFormat::Mnemonic).unwrap_err());
}

#[test]
fn renamed_record_file_is_corrupt() {
    let (mgr, _dir) = test_manager();
    mgr.create("w1", b"pw", WalletKind::PrivateKey).unwrap();
    fs::copy(record_path(&mgr, "w1"), record_path(&mgr, "w2")).unwrap();
    assert_corrupt(mgr.get_address("w2").unwrap_err());

    let names: Vec<_> = mgr.list().unwrap().into_iter().map(|s| s.name).collect();
    assert_eq!(names, vec!["w1".to_string()]);
}

#[test]
fn unknown_format_version_is_corrupt() {
    let (mgr, _dir) = test_manager();
    mgr.create("w", b"pw", WalletKind::PrivateKey).unwrap();
    rewrite_record(&mgr, "w", |r| r.version = "99".into());
    assert_corrupt(mgr.get_address("w").unwrap_err());
}

#[test]
fn hostile_kdf_params_in_record_are_corrupt() {
    let (mgr, _dir) = test_manager();
    mgr.create("w", b"pw", WalletKind::PrivateKey).unwrap();
    let config = MemoryConfigStore::new();
    let original = fs::read(record_path(&mgr, "w")).unwrap();
    let edits: [fn(&mut WalletRecord); 3] = [
        |r| r.kdf.p_cost = 0,
        |r| r.kdf.m_cost = u32::MAX,
        |r| r.kdf.t_cost = u32::MAX,
    ];
    for edit in edits {
        fs::write(record_path(&mgr, "w"), &original).unwrap();
        rewrite_record(&mgr, "w", edit);
        assert_corrupt(mgr.export("w", b"pw", ExportFormat::PrivateKey).unwrap_err());
        assert_corrupt(mgr.delete("w", b"pw", &config).unwrap_err());
        assert!(mgr.store().exists("w"));
    }
}

#[test]
fn keystore_with_huge_memory_cost_is_rejected() {
    let (mgr, _dir) = test_manager();
    mgr.create("src", b"pw", WalletKind::PrivateKey).unwrap();
    let json = match mgr
        .export(
            "src",
            b"pw",
            ExportFormat::Keystore {
                password: Zeroizing::new("ks".into()),
            },
        )
        .unwrap()
    {
        ExportedSecret::Keystore(json) => json,
        other => panic!("unexpected export {other:?}"),
    };
    let mut blob: serde_json::Value = serde_json::from_str(&json).unwrap();
    blob["crypto"]["kdfparams"]["mCost"] = serde_json::json!(u32::MAX);

    let err = mgr
        .import(
            "dst",
            b"pw",
            ImportSecret::Keystore {
                json: blob.to_string(),
                password: Zeroizing::new("ks".into()),
            },
        )
        .unwrap_err();
    assert!(matches!(err, WalletError::InvalidKeystore(_)), "{err}");
    assert!(!mgr.store().exists("dst"));
}

#[test]
fn stray_files_do_not_break_listing() {
    let (mgr, _dir) = test_manager();
    mgr.create("good", b"pw", WalletKind::PrivateKey).unwrap();
    let dir = mgr.store().dir();
    fs::write(dir.join(".tmp-abc.partial"), b"{\"name\":").unwrap();
    fs::write(dir.join("README"), b"hello").unwrap();
    fs::write(dir.join("broken.json"), b"[]").unwrap();
    fs::create_dir(dir.join("nested.json")).unwrap();

    let names: Vec<_> = mgr.list().unwrap().into_iter().map(|s| s.name).collect();
    assert_eq!(names, vec!["good".to_string()]);
}

// ---------------------------------------------------------------------------
// Names and races
// ---------------------------------------------------------------------------

#[test]
fn path_escaping_names_rejected_everywhere() {
    let (mgr, dir) = test_manager();
    let config = MemoryConfigStore::new();
    for name in ["../outside", "/etc/passwd", "a\\b", ".hidden", ""] {
        assert!(matches!(
            mgr.create(name, b"pw", WalletKind::PrivateKey).unwrap_err(),
            WalletError::InvalidWalletName { .. }
        ));
        assert!(matches!(
            mgr.use_wallet(name, &config).unwrap_err(),
            WalletError::InvalidWalletName { .. }
        ));
    }
    assert!(!dir.path().join("outside.json").exists());
}

#[test]
fn concurrent_creates_of_one_name_yield_one_winner() {
    let (config, _dir) = test_config();
    let mgr = Arc::new(WalletManager::new(&config));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let mgr = Arc::clone(&mgr);
            thread::spawn(move || {
                let password = format!("pw-{i}");
                mgr.create("contested", password.as_bytes(), WalletKind::PrivateKey)
                    .map(|created| (password, created.address))
            })
        })
        .collect();

    let mut winners = Vec::new();
    for handle in handles {
        match handle.join().unwrap() {
            Ok(winner) => winners.push(winner),
            Err(e) => assert_eq!(e, WalletError::WalletAlreadyExists("contested".into())),
        }
    }
    assert_eq!(winners.len(), 1);

    let (password, address) = &winners[0];
    assert_eq!(mgr.get_address("contested").unwrap(), *address);
    assert!(
        mgr.export("contested", password.as_bytes(), ExportFormat::PrivateKey)
            .is_ok()
    );
}

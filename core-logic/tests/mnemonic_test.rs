use core_logic::{ConfigError, MnemonicManager, MnemonicSource, WalletLoader};
use std::io::Write;
use tempfile::NamedTempFile;

const PHRASE_A: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";
const PHRASE_B: &str = "legal winner thank year wave sausage worth useful legal winner thank yellow";

#[tokio::test]
async fn test_load_from_file_preserves_order() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{}", PHRASE_A).unwrap();
    writeln!(file).unwrap();
    writeln!(file, "  {}  ", PHRASE_B).unwrap();

    let manager = MnemonicManager::from_file(file.path().to_string_lossy().to_string());
    let phrases = manager.load().await.unwrap();

    assert_eq!(phrases.len(), 2);
    assert_eq!(phrases[0].phrase(), PHRASE_A);
    assert_eq!(phrases[1].phrase(), PHRASE_B);
    assert_eq!(phrases[0].word_count(), 12);
}

#[tokio::test]
async fn test_empty_file_is_fatal() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "\n\n").unwrap();

    let manager = MnemonicManager::from_file(file.path().to_string_lossy().to_string());
    let err = manager.load().await.unwrap_err();
    assert!(matches!(err, ConfigError::NoMnemonics { .. }));
}

#[tokio::test]
async fn test_missing_file() {
    let manager = MnemonicManager::from_file("/definitely/not/here/phrase.txt");
    let err = manager.load().await.unwrap_err();
    assert_eq!(
        err,
        ConfigError::FileNotFound {
            path: "/definitely/not/here/phrase.txt".to_string()
        }
    );
}

#[tokio::test]
async fn test_load_from_env_through_wallet_loader() {
    let key = "CORE_LOGIC_TEST_MNEMONICS";
    std::env::set_var(key, format!("{}\n{}\n", PHRASE_A, PHRASE_B));

    let manager = MnemonicManager::new(MnemonicSource::Env {
        key: key.to_string(),
    });
    let phrases = manager.load_wallets().await.unwrap();
    assert_eq!(phrases.len(), 2);

    std::env::remove_var(key);
}

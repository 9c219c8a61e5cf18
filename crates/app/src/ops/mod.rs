pub mod identity;
pub mod init;
pub mod keygen;
pub mod open;
pub mod seal;
pub mod version;

pub use identity::Identity;
pub use init::Init;
pub use keygen::Keygen;
pub use open::Open;
pub use seal::Seal;
pub use version::Version;

#[cfg(test)]
mod test {
    use std::path::{Path, PathBuf};

    use common::cipher::CipherError;
    use common::crypto::PublicKey;
    use common::document::DocumentError;
    use tempfile::TempDir;

    use super::*;
    use crate::op::{Op, OpContext};
    use crate::state::AppState;

    async fn init(root: &Path, name: &str) -> (OpContext, PublicKey) {
        let ctx = OpContext::new(Some(root.join(name)));
        Init {
            name: Some(name.to_string()),
            store_path: None,
        }
        .execute(&ctx)
        .await
        .unwrap();
        let public_key = AppState::load(ctx.config_path.clone())
            .unwrap()
            .load_key()
            .unwrap()
            .public();
        (ctx, public_key)
    }

    fn seal(file: &Path, to: Option<PublicKey>) -> Seal {
        Seal {
            file: file.to_path_buf(),
            to,
            mime: None,
        }
    }

    fn open(cid: &str, with: Option<PublicKey>, output: Option<PathBuf>) -> Open {
        Open {
            cid: cid.parse().unwrap(),
            with,
            output,
        }
    }

    #[tokio::test]
    async fn test_seal_open_for_self() {
        let temp_dir = TempDir::new().unwrap();
        let (ctx, _) = init(temp_dir.path(), "alice").await;

        let file = temp_dir.path().join("note.json");
        tokio::fs::write(&file, br#"{"prop1":1,"prop2":"hola"}"#)
            .await
            .unwrap();

        let cid = seal(&file, None).execute(&ctx).await.unwrap();
        let output = open(&cid, None, None).execute(&ctx).await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value, serde_json::json!({"prop1": 1, "prop2": "hola"}));
    }

    #[tokio::test]
    async fn test_seal_rejects_invalid_json() {
        let temp_dir = TempDir::new().unwrap();
        let (ctx, _) = init(temp_dir.path(), "alice").await;

        let file = temp_dir.path().join("broken.json");
        tokio::fs::write(&file, b"{not json").await.unwrap();
        assert!(seal(&file, None).execute(&ctx).await.is_err());
    }

    #[tokio::test]
    async fn test_shared_between_two_identities() {
        let temp_dir = TempDir::new().unwrap();
        let store = temp_dir.path().join("shared-store");
        let (alice, alice_pk) = init(temp_dir.path(), "alice").await;
        let bob = OpContext::new(Some(temp_dir.path().join("bob")));
        Init {
            name: Some("bob".into()),
            store_path: Some(store.clone()),
        }
        .execute(&bob)
        .await
        .unwrap();
        let bob_pk = AppState::load(bob.config_path.clone())
            .unwrap()
            .load_key()
            .unwrap()
            .public();
        let (carol, _) = init(temp_dir.path(), "carol").await;

        let file = temp_dir.path().join("contract.pdf");
        tokio::fs::write(&file, b"%PDF-1.7").await.unwrap();
        let cid = seal(&file, Some(bob_pk)).execute(&alice).await.unwrap();

        // hand the sealed blob to bob's store
        let alice_store = AppState::load(alice.config_path.clone()).unwrap().store_path;
        tokio::fs::copy(alice_store.join(&cid), store.join(&cid))
            .await
            .unwrap();

        let out = temp_dir.path().join("opened.pdf");
        let report = open(&cid, Some(alice_pk), Some(out.clone()))
            .execute(&bob)
            .await
            .unwrap();
        assert!(report.contains("application/pdf"));
        assert_eq!(tokio::fs::read(&out).await.unwrap(), b"%PDF-1.7");

        // the sender can still read it back
        let output = open(&cid, Some(bob_pk), None).execute(&alice).await.unwrap();
        assert_eq!(output, "%PDF-1.7");

        // nobody else can, even holding the blob
        let carol_store = AppState::load(carol.config_path.clone()).unwrap().store_path;
        tokio::fs::copy(alice_store.join(&cid), carol_store.join(&cid))
            .await
            .unwrap();
        assert!(matches!(
            open(&cid, Some(alice_pk), None).execute(&carol).await,
            Err(open::OpenError::Document(DocumentError::Cipher(
                CipherError::InvalidMac
            )))
        ));
    }

    #[tokio::test]
    async fn test_commands_need_init() {
        let temp_dir = TempDir::new().unwrap();
        let ctx = OpContext::new(Some(temp_dir.path().join("missing")));
        assert!(Identity.execute(&ctx).await.is_err());
        assert!(Keygen.execute(&ctx).await.is_ok());
    }
}

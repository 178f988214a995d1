/*!
# Laverie DevKit - Stubs et Utilitaires pour Développement

Bibliothèque facilitant le développement des consommateurs du dashboard avec:
- Stub du flux événements pour tests sans serveur WebSocket
- Builders de messages conformes au format du backend
- Harness de test avec expectations et assertions sur le cache
*/

pub mod feed_stub;
pub mod test_utils;

pub use feed_stub::{FeedStub, LaverieMessageBuilder};
pub use test_utils::TestHarness;

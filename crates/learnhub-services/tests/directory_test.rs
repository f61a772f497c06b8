mod common;

use common::World;
use learnhub_core::models::UserRole;
use learnhub_core::AppError;

#[tokio::test]
async fn test_admin_lists_accounts_with_organizations() {
    let world = World::new().await;
    let (acme, acme_admin) = world.organization("acme").await;
    let (globex, _) = world.organization("globex").await;
    world.employee(&acme_admin, "alice").await;

    let users = world.services.directory.list_users(&world.admin).await.unwrap();
    assert_eq!(users.len(), 4);
    let root = users.iter().find(|e| e.user.username == "root").unwrap();
    assert!(root.organization.is_none());
    let alice = users.iter().find(|e| e.user.username == "alice").unwrap();
    assert_eq!(alice.organization.as_ref().map(|o| o.id), Some(acme));

    let admins = world
        .services
        .directory
        .list_portal_admins(&world.admin)
        .await
        .unwrap();
    assert_eq!(admins.len(), 2);
    assert!(admins.iter().all(|e| e.user.role == UserRole::PortalAdmin));
    let mut orgs: Vec<_> = admins
        .iter()
        .filter_map(|e| e.organization.as_ref().map(|o| o.id))
        .collect();
    orgs.sort();
    let mut expected = vec![acme, globex];
    expected.sort();
    assert_eq!(orgs, expected);
}

#[tokio::test]
async fn test_directory_listings_are_admin_only() {
    let world = World::new().await;
    let (_, portal) = world.organization("acme").await;
    let alice = world.employee(&portal, "alice").await;

    for actor in [&portal, &alice] {
        let err = world.services.directory.list_users(actor).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
        let err = world
            .services
            .directory
            .list_portal_admins(actor)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }
}

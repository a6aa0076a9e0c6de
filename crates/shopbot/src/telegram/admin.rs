use shopcore::config::admin::ADMIN_IDS;

/// Check if user is an operator allowed to edit the catalog
pub fn is_admin(user_id: i64) -> bool {
    is_admin_in(&ADMIN_IDS, user_id)
}

pub fn is_admin_in(admin_ids: &[i64], user_id: i64) -> bool {
    admin_ids.contains(&user_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_admin_in() {
        assert!(is_admin_in(&[1, 2], 2));
        assert!(!is_admin_in(&[1, 2], 3));
        assert!(!is_admin_in(&[], 1));
    }
}

use rand::Rng;

/// Génère un code OTP numérique à 6 chiffres (100000 à 999999)
pub fn generate_otp() -> String {
    rand::thread_rng().gen_range(100000..1000000).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_otp_is_six_digits() {
        for _ in 0..100 {
            let code = generate_otp();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }
}

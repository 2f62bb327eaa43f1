// Utilitaires DSP - Hygiène audio et smoothing
//
// Ce module contient les fonctions utilisées dans le callback temps-réel
// pour garder la sortie propre : anti-dénormaux, saturation, lissage des gains.

/// Flush denormals to zero (anti-dénormaux)
///
/// Les nombres dénormaux (très proches de 0) peuvent causer des ralentissements CPU
/// importants sur certains processeurs. Les queues de décroissance exponentielle
/// des voix de batterie y passent systématiquement.
///
/// Seuil: 1e-15 (largement sous le bruit numérique à 32-bit float)
#[inline]
pub fn flush_denormals_to_zero(x: f32) -> f32 {
    if x.abs() < 1e-15 { 0.0 } else { x }
}

/// Soft clipping avec tanh (saturation douce)
///
/// Les gains maximum des bus dépassent 1.0, une grosse caisse à fond
/// sature donc doucement au lieu de claquer.
#[inline]
pub fn soft_clip(x: f32) -> f32 {
    x.tanh()
}

/// Smoother 1-pole (filtre passe-bas du 1er ordre)
///
/// Lisse les changements de gain pour éviter les clics.
///
/// Formule: y[n] = y[n-1] + α * (x[n] - y[n-1]), avec α = 1 - e^(-1/(τ * sr)),
/// soit une approche exponentielle de constante de temps τ.
#[derive(Debug, Clone)]
pub struct OnePoleSmoother {
    current: f32,
    coefficient: f32,
}

impl OnePoleSmoother {
    /// Crée un nouveau smoother
    ///
    /// # Arguments
    /// * `initial_value` - Valeur de départ
    /// * `time_constant` - Temps pour atteindre ~63% de la cible (en secondes)
    /// * `sample_rate` - Sample rate en Hz
    ///
    /// # Exemple
    /// ```
    /// use drumloop::audio::dsp_utils::OnePoleSmoother;
    /// // Smoothing de 10ms à 48kHz
    /// let smoother = OnePoleSmoother::new(0.5, 0.01, 48000.0);
    /// assert_eq!(smoother.get(), 0.5);
    /// ```
    pub fn new(initial_value: f32, time_constant: f32, sample_rate: f32) -> Self {
        let time_constant_samples = (time_constant * sample_rate) as f64;
        let coefficient = if time_constant_samples > 0.0 {
            1.0 - (-1.0 / time_constant_samples).exp()
        } else {
            1.0 // τ nul : suit la cible immédiatement
        };

        Self {
            current: initial_value,
            coefficient: coefficient as f32,
        }
    }

    /// Process un nouveau sample (next target value)
    #[inline]
    pub fn process(&mut self, target: f32) -> f32 {
        self.current += self.coefficient * (target - self.current);

        // Anti-denormals sur le state interne
        self.current = flush_denormals_to_zero(self.current);

        self.current
    }

    /// Obtenir la valeur courante sans la modifier
    #[inline]
    pub fn get(&self) -> f32 {
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flush_denormals() {
        assert_eq!(flush_denormals_to_zero(1e-20), 0.0);
        assert_eq!(flush_denormals_to_zero(0.1), 0.1);
        assert_eq!(flush_denormals_to_zero(-0.1), -0.1);
    }

    #[test]
    fn test_soft_clip() {
        // Dans la plage normale
        assert!((soft_clip(0.0) - 0.0).abs() < 0.001);
        assert!((soft_clip(0.5) - 0.462).abs() < 0.01);

        // Saturation : tanh converge vers ±1.0 asymptotiquement
        assert!(soft_clip(10.0) <= 1.0);
        assert!(soft_clip(10.0) > 0.99);
        assert!(soft_clip(-10.0) >= -1.0);
        assert!(soft_clip(-10.0) < -0.99);
    }

    #[test]
    fn test_smoother_time_constant() {
        // 10ms à 48kHz = 480 samples pour 63% de convergence
        let mut smoother = OnePoleSmoother::new(0.0, 0.01, 48000.0);
        let mut value = 0.0;
        for _ in 0..480 {
            value = smoother.process(1.0);
        }
        let expected = 1.0 - (-1.0f32).exp();
        assert!((value - expected).abs() < 0.01, "got {}", value);
    }

    #[test]
    fn test_smoother_convergence() {
        let mut smoother = OnePoleSmoother::new(0.0, 0.01, 44100.0);

        // 100ms = 10 constantes de temps
        let mut final_value = 0.0;
        for _ in 0..4410 {
            final_value = smoother.process(1.0);
        }

        assert!((final_value - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_smoother_no_overshoot() {
        let mut smoother = OnePoleSmoother::new(0.0, 0.005, 44100.0);

        // Ne doit jamais dépasser la cible
        for _ in 0..100 {
            let value = smoother.process(1.0);
            assert!(value <= 1.0);
            assert!(value >= 0.0);
        }
    }

    #[test]
    fn test_zero_time_constant_jumps() {
        let mut smoother = OnePoleSmoother::new(0.0, 0.0, 48000.0);
        assert_eq!(smoother.process(0.7), 0.7);
    }
}

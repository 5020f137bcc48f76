pub mod configuration;

pub mod math {
    pub mod curve {
        pub mod curve;
        pub mod nonparametriccurve {
            pub mod nonparametriccurve;
            pub mod piecewisepolynomial;
        }
    }
    pub mod grid;
    pub mod polynomial;
    pub mod tridiagonal;
}

pub mod morph {
    pub mod morph;
    pub mod morpherror;
    pub mod morphwarning;
    pub mod morphscale;
    pub mod morphshift;
    pub mod morphstretch;
    pub mod morphsqueeze;
}
